//! OAuth 1.0a HMAC-SHA1 authentication for the Cardmarket API.
//!
//! Signing is a pure function of credentials, request, timestamp and nonce.
//! [`OAuth1Auth::authorization_header`] draws a fresh timestamp and nonce;
//! [`OAuth1Auth::authorization_header_at`] takes them explicitly.

mod encode;
mod params;
mod signature;

use std::fmt;

use cardmarket_config::CredentialsConfig;
use tracing::debug;

use crate::error::ClientError;

pub use encode::{oauth_encode, uri_component_encode};
pub use params::{
    OAUTH_VERSION, ParamMap, REQUIRED_OAUTH_PARAMS, SIGNATURE_METHOD, join_params,
    normalize_params, oauth_params, sort_params,
};
pub use signature::{
    build_authorization_header, build_signature_base_string, generate_nonce, generate_timestamp,
    sign_hmac_sha1, signature_key,
};

/// Application and access credentials.
///
/// Consumer key and secret are required. An access token and secret are
/// optional and independent of each other; empty strings count as absent.
#[derive(Clone)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    token: Option<String>,
    token_secret: Option<String>,
}

impl Credentials {
    /// Validate and build credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Credentials`] if the consumer key or secret is empty.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: Option<String>,
        token_secret: Option<String>,
    ) -> Result<Self, ClientError> {
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();

        if consumer_key.is_empty() {
            return Err(ClientError::Credentials("app token is required".to_owned()));
        }
        if consumer_secret.is_empty() {
            return Err(ClientError::Credentials("app secret is required".to_owned()));
        }

        Ok(Self {
            consumer_key,
            consumer_secret,
            token: token.filter(|t| !t.is_empty()),
            token_secret: token_secret.filter(|s| !s.is_empty()),
        })
    }

    /// OAuth consumer key (Cardmarket app token).
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// OAuth access token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl TryFrom<&CredentialsConfig> for Credentials {
    type Error = ClientError;

    fn try_from(config: &CredentialsConfig) -> Result<Self, Self::Error> {
        Self::new(
            config.app_token.as_str(),
            config.app_secret.as_str(),
            config.access_token.clone(),
            config.access_secret.clone(),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// OAuth 1.0a HMAC-SHA1 request signer.
#[derive(Debug, Clone)]
pub struct OAuth1Auth {
    credentials: Credentials,
}

impl OAuth1Auth {
    /// Create a signer for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Credentials used for signing.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Protocol parameters for a request made at `timestamp` with `nonce`.
    pub fn oauth_params(&self, timestamp: u64, nonce: &str) -> ParamMap {
        oauth_params(
            &self.credentials.consumer_key,
            self.credentials.token(),
            timestamp,
            nonce,
        )
    }

    /// Compute the base64 HMAC-SHA1 signature for a request.
    ///
    /// # Arguments
    /// * `method` - HTTP method, uppercase (GET, POST, etc.)
    /// * `base_url` - URL without query string (<scheme://host/path>)
    /// * `oauth_params` - Protocol parameters for this request
    /// * `query_params` - Query parameters to include in signature
    pub fn signature(
        &self,
        method: &str,
        base_url: &str,
        oauth_params: &ParamMap,
        query_params: &[(String, String)],
    ) -> String {
        let params = normalize_params(oauth_params, query_params);
        let base_string = build_signature_base_string(method, base_url, &params);
        debug!(%base_string, "Built signature base string");

        let key = signature_key(
            &self.credentials.consumer_secret,
            self.credentials.token_secret.as_deref(),
        );
        let signature = sign_hmac_sha1(&base_string, &key);
        debug!(%signature, "Signed request");
        signature
    }

    /// Create `Authorization` header value with a fresh timestamp and nonce.
    pub fn authorization_header(
        &self,
        method: &str,
        base_url: &str,
        query_params: &[(String, String)],
    ) -> String {
        self.authorization_header_at(
            method,
            base_url,
            query_params,
            generate_timestamp(),
            &generate_nonce(),
        )
    }

    /// Create `Authorization` header value for a fixed timestamp and nonce.
    ///
    /// The realm is `base_url`. Query parameters are signed but never
    /// rendered into the header.
    pub fn authorization_header_at(
        &self,
        method: &str,
        base_url: &str,
        query_params: &[(String, String)],
        timestamp: u64,
        nonce: &str,
    ) -> String {
        let oauth_params = self.oauth_params(timestamp, nonce);
        let signature = self.signature(method, base_url, &oauth_params, query_params);
        let header = build_authorization_header(base_url, &oauth_params, &signature);
        debug!(%header, "Built authorization header");
        header
    }
}
