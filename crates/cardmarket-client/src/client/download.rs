//! Download of base64-encoded file payloads.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use cardmarket_config::ResponseFormat;
use serde_json::Value;
use tracing::{debug, info};

use super::{CardmarketClient, DOWNLOAD_BODY_LIMIT};
use crate::error::ClientError;
use crate::types::{HttpMethod, ResponseBody};

/// Response fields that accompany the payload but never hold it.
const IGNORED_KEYS: [&str; 2] = ["mime", "links"];

/// Extension of files written by [`CardmarketClient::download`].
const PAYLOAD_EXTENSION: &str = "csv.gz";

impl CardmarketClient {
    /// GET a route whose JSON body carries a base64-encoded file and write it
    /// to `<work_dir>/<field>.csv.gz`.
    ///
    /// The request always goes to the JSON endpoint. Returns the written path,
    /// or `None` in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Payload`] unless the body has exactly one string
    /// field outside `mime` and `links`.
    pub fn download(&self, route: &str) -> Result<Option<PathBuf>, ClientError> {
        info!("Downloading from route {}", route);

        let body = self.with_response_format(ResponseFormat::Json).send(
            HttpMethod::Get,
            route,
            &[],
            DOWNLOAD_BODY_LIMIT,
        )?;
        let Some(ResponseBody::Json(body)) = body else {
            return Ok(None);
        };

        let (name, data) = extract_payload(&body)?;
        let path = write_payload(&self.options.work_dir, &name, &data)?;

        info!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(Some(path))
    }
}

/// Find and decode the payload field of a download response.
fn extract_payload(body: &Value) -> Result<(String, Vec<u8>), ClientError> {
    let Some(fields) = body.as_object() else {
        return Err(ClientError::Payload("response body is not an object".to_owned()));
    };

    let candidates: Vec<_> = fields
        .iter()
        .filter(|(key, _)| !IGNORED_KEYS.contains(&key.as_str()))
        .collect();

    let [(name, value)] = candidates.as_slice() else {
        let names: Vec<_> = candidates.iter().map(|(k, _)| k.as_str()).collect();
        return Err(ClientError::Payload(format!(
            "expected exactly one payload field, found [{}]",
            names.join(", ")
        )));
    };

    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ClientError::Payload(format!("unusable field name '{name}'")));
    }

    let encoded = value
        .as_str()
        .ok_or_else(|| ClientError::Payload(format!("field '{name}' is not a string")))?;

    // Long base64 payloads may be wrapped
    let compact: String = encoded.split_ascii_whitespace().collect();
    let data = BASE64_STANDARD.decode(compact)?;

    debug!("Decoded payload field '{}' ({} bytes)", name, data.len());
    Ok(((*name).clone(), data))
}

/// Write decoded payload bytes, creating the working directory if needed.
fn write_payload(work_dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, ClientError> {
    std::fs::create_dir_all(work_dir)?;
    let path = work_dir.join(format!("{name}.{PAYLOAD_EXTENSION}"));
    std::fs::write(&path, data)?;
    Ok(path)
}
