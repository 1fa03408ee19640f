//! Cardmarket REST API client.
//!
//! Provides sync HTTP client for the Cardmarket API (`/ws/v2.0`)
//! with OAuth 1.0a HMAC-SHA1 authentication.

mod download;

use std::path::PathBuf;
use std::time::Duration;

use cardmarket_config::{Config, Environment, ResponseFormat};
use tracing::{debug, info};
use ureq::Agent;

use crate::error::ClientError;
use crate::oauth::{
    Credentials, OAuth1Auth, generate_nonce, generate_timestamp, uri_component_encode,
};
use crate::types::{HttpMethod, ResponseBody, SignedRequest};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// API version path shared by all endpoints.
const API_PATH: &str = "/ws/v2.0";

/// Response body limit for regular API calls (ureq's default).
const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

/// Response body limit for base64 file downloads.
const DOWNLOAD_BODY_LIMIT: u64 = 256 * 1024 * 1024;

/// Client settings that select the endpoint and request handling.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Production or sandbox host.
    pub environment: Environment,
    /// JSON or XML endpoints.
    pub response_format: ResponseFormat,
    /// Sign and log requests without sending them.
    pub dry_run: bool,
    /// Directory that receives downloaded files.
    pub work_dir: PathBuf,
}

impl ClientOptions {
    /// Take options from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            environment: config.api.environment,
            response_format: config.api.response_format,
            dry_run: config.api.dry_run,
            work_dir: config.work_dir.clone(),
        }
    }
}

/// Cardmarket REST API client.
///
/// Configuration is fixed at construction. Use [`with_environment`](Self::with_environment)
/// and [`with_response_format`](Self::with_response_format) to derive differently
/// configured clients.
#[derive(Clone)]
pub struct CardmarketClient {
    agent: Agent,
    auth: OAuth1Auth,
    options: ClientOptions,
}

impl CardmarketClient {
    /// Create client from validated credentials.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            auth: OAuth1Auth::new(credentials),
            options,
        }
    }

    /// Create client from config values.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the `[credentials]` section is missing
    /// or incomplete.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let credentials = Credentials::try_from(config.require_credentials()?)?;
        Ok(Self::new(credentials, ClientOptions::from_config(config)))
    }

    /// Same client pointed at another environment.
    #[must_use]
    pub fn with_environment(&self, environment: Environment) -> Self {
        let mut client = self.clone();
        client.options.environment = environment;
        client
    }

    /// Same client requesting another response format.
    #[must_use]
    pub fn with_response_format(&self, response_format: ResponseFormat) -> Self {
        let mut client = self.clone();
        client.options.response_format = response_format;
        client
    }

    /// Active client options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Canonical endpoint URL for a route, without query string.
    ///
    /// This is also the OAuth realm and the URL that gets signed.
    pub fn endpoint_url(&self, route: &str) -> String {
        format!(
            "https://{}{API_PATH}/output.{}{route}",
            self.options.environment.host(),
            self.options.response_format,
        )
    }

    /// Full request URL with URI-component encoded query values.
    pub fn request_url(&self, route: &str, query_params: &[(String, String)]) -> String {
        let mut url = self.endpoint_url(route);
        if !query_params.is_empty() {
            let query = query_params
                .iter()
                .map(|(k, v)| format!("{k}={}", uri_component_encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Sign a request without sending it.
    ///
    /// Repeated query keys collapse to their last value and apostrophes in
    /// values become spaces. The URL and the signature are built from the
    /// same resulting set.
    pub fn sign(
        &self,
        method: HttpMethod,
        route: &str,
        query_params: &[(String, String)],
    ) -> SignedRequest {
        self.sign_at(
            method,
            route,
            query_params,
            generate_timestamp(),
            &generate_nonce(),
        )
    }

    /// Sign a request for a fixed timestamp and nonce.
    pub fn sign_at(
        &self,
        method: HttpMethod,
        route: &str,
        query_params: &[(String, String)],
        timestamp: u64,
        nonce: &str,
    ) -> SignedRequest {
        let query_params = prepare_query(query_params);
        let endpoint = self.endpoint_url(route);
        let authorization = self.auth.authorization_header_at(
            method.as_str(),
            &endpoint,
            &query_params,
            timestamp,
            nonce,
        );
        let url = self.request_url(route, &query_params);
        debug!(%url, "Built request URL");

        SignedRequest {
            method,
            url,
            authorization,
        }
    }

    /// GET a route.
    ///
    /// Returns `None` in dry-run mode.
    pub fn get(
        &self,
        route: &str,
        query_params: &[(String, String)],
    ) -> Result<Option<ResponseBody>, ClientError> {
        self.request(HttpMethod::Get, route, query_params)
    }

    /// Sign and send a request, then parse the body per the response format.
    ///
    /// Query parameters are prepared as in [`sign`](Self::sign).
    /// Returns `None` in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpResponse`] for 4xx/5xx statuses, carrying
    /// the response body, and [`ClientError::HttpRequest`] for transport failures.
    pub fn request(
        &self,
        method: HttpMethod,
        route: &str,
        query_params: &[(String, String)],
    ) -> Result<Option<ResponseBody>, ClientError> {
        self.send(method, route, query_params, DEFAULT_BODY_LIMIT)
    }

    /// Sign and send a request, reading at most `body_limit` response bytes.
    fn send(
        &self,
        method: HttpMethod,
        route: &str,
        query_params: &[(String, String)],
        body_limit: u64,
    ) -> Result<Option<ResponseBody>, ClientError> {
        let signed = self.sign(method, route, query_params);

        info!("{} {}", signed.method, signed.url);

        if self.options.dry_run {
            info!("Dry run enabled, request not sent");
            return Ok(None);
        }

        let url = &signed.url;
        let auth_header = &signed.authorization;
        let response = match method {
            HttpMethod::Get => self
                .agent
                .get(url)
                .header("Authorization", auth_header)
                .call()?,
            HttpMethod::Delete => self
                .agent
                .delete(url)
                .header("Authorization", auth_header)
                .call()?,
            HttpMethod::Post => self
                .agent
                .post(url)
                .header("Authorization", auth_header)
                .send(&[] as &[u8])?,
            HttpMethod::Put => self
                .agent
                .put(url)
                .header("Authorization", auth_header)
                .send(&[] as &[u8])?,
        };

        let status = response.status().as_u16();
        let body = read_body(response.into_body(), body_limit)?;

        debug!(status, "Received response");

        read_response(status, body, self.options.response_format).map(Some)
    }
}

/// Collapse repeated keys and replace apostrophes in values, which the API
/// rejects.
///
/// A repeated key keeps the position of its first occurrence and the value
/// of its last.
fn prepare_query(query_params: &[(String, String)]) -> Vec<(String, String)> {
    let mut prepared: Vec<(String, String)> = Vec::with_capacity(query_params.len());
    for (key, value) in query_params {
        let value = value.replace('\'', " ");
        match prepared.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                debug!(%key, "Repeated query parameter, keeping last value");
                entry.1 = value;
            }
            None => prepared.push((key.clone(), value)),
        }
    }
    prepared
}

/// Read a response body as text, failing past `limit` bytes.
fn read_body(body: ureq::Body, limit: u64) -> Result<String, ClientError> {
    Ok(body.into_with_config().limit(limit).read_to_string()?)
}

/// Turn a raw response into a parsed body or an error.
fn read_response(
    status: u16,
    body: String,
    response_format: ResponseFormat,
) -> Result<ResponseBody, ClientError> {
    if status >= 400 {
        return Err(ClientError::HttpResponse { status, body });
    }

    match response_format {
        ResponseFormat::Json => Ok(ResponseBody::Json(serde_json::from_str(&body)?)),
        ResponseFormat::Xml => Ok(ResponseBody::Text(body)),
    }
}
