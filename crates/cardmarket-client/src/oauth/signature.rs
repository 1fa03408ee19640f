//! OAuth 1.0a HMAC-SHA1 signature generation (RFC 5849).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use super::encode::oauth_encode;
use super::params::{ParamMap, join_params};

type HmacSha1 = Hmac<Sha1>;

/// Generate a 32 hex character nonce.
pub fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate Unix timestamp in seconds.
pub fn generate_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Build the HMAC key from consumer secret and optional token secret.
///
/// The `&` separator is always present, even without a token secret.
pub fn signature_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        oauth_encode(consumer_secret),
        token_secret.map(oauth_encode).unwrap_or_default()
    )
}

/// Build OAuth signature base string per RFC 5849 Section 3.4.1.
///
/// Format: `HTTP_METHOD&encoded_base_url&encoded_parameters`
///
/// `method` is used verbatim and `base_url` must not carry a query string.
/// The joined parameter string already contains URI-encoded values and is
/// encoded once more as a whole.
pub fn build_signature_base_string(method: &str, base_url: &str, params: &ParamMap) -> String {
    format!(
        "{}&{}&{}",
        method,
        oauth_encode(base_url),
        oauth_encode(&join_params(params))
    )
}

/// Sign data with HMAC-SHA1 and return base64-encoded digest.
pub fn sign_hmac_sha1(base_string: &str, key: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Build OAuth Authorization header value.
///
/// Renders `OAuth realm="..."`, each protocol parameter as `key="value"` in
/// key order, and `oauth_signature` last. Values are not re-encoded.
pub fn build_authorization_header(realm: &str, oauth_params: &ParamMap, signature: &str) -> String {
    let mut header = format!("OAuth realm=\"{realm}\",");
    for (key, value) in oauth_params {
        header.push_str(&format!("{key}=\"{value}\","));
    }
    header.push_str(&format!("oauth_signature=\"{signature}\""));
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::params::{normalize_params, oauth_params};
    use pretty_assertions::assert_eq;

    const APP_TOKEN: &str = "xFAKEkFAKEL8FAKE";
    const APP_SECRET: &str = "kgFAKEfVxp8xFAKENWEaY15FAKE8fM8G";
    const NONCE: &str = "64d1da68f05746329c61c9961f6ead85";
    const TIMESTAMP: u64 = 1_562_565_252;
    const URL: &str = "https://api.cardmarket.com/ws/v2.0/output.json/route";

    fn fixed_params() -> ParamMap {
        oauth_params(APP_TOKEN, None, TIMESTAMP, NONCE)
    }

    #[test]
    fn test_nonce_uniqueness() {
        let nonce1 = generate_nonce();
        let nonce2 = generate_nonce();
        assert_ne!(nonce1, nonce2);
        assert_eq!(nonce1.len(), 32);
        assert!(nonce1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_timestamp_is_positive() {
        assert!(generate_timestamp() > TIMESTAMP);
    }

    #[test]
    fn test_signature_key_without_token_secret() {
        assert_eq!(
            signature_key(APP_SECRET, None),
            "kgFAKEfVxp8xFAKENWEaY15FAKE8fM8G&"
        );
    }

    #[test]
    fn test_signature_key_encodes_both_parts() {
        assert_eq!(signature_key("a b", Some("c&d")), "a%20b&c%26d");
    }

    #[test]
    fn test_signature_base_string() {
        let params = normalize_params(&fixed_params(), &[]);
        let base = build_signature_base_string("GET", URL, &params);

        assert_eq!(
            base,
            "GET&https%3A%2F%2Fapi.cardmarket.com%2Fws%2Fv2.0%2Foutput.json%2Froute&\
             oauth_consumer_key%3DxFAKEkFAKEL8FAKE\
             %26oauth_nonce%3D64d1da68f05746329c61c9961f6ead85\
             %26oauth_signature_method%3DHMAC-SHA1\
             %26oauth_timestamp%3D1562565252\
             %26oauth_token%3D\
             %26oauth_version%3D1.0"
        );
    }

    #[test]
    fn test_signature_base_string_double_encodes_query() {
        let query = vec![("search".to_owned(), "Edgar Markov".to_owned())];
        let params = normalize_params(&fixed_params(), &query);
        let base = build_signature_base_string("GET", URL, &params);

        assert!(base.ends_with("%26search%3DEdgar%2520Markov"));
    }

    #[test]
    fn test_hmac_known_value() {
        assert_eq!(
            sign_hmac_sha1(APP_TOKEN, APP_SECRET),
            "NBhSEHjTSiSkfOyafRdYeYxbjzM="
        );
    }

    #[test]
    fn test_signature_known_value() {
        let params = normalize_params(&fixed_params(), &[]);
        let base = build_signature_base_string("GET", URL, &params);
        let signature = sign_hmac_sha1(&base, &signature_key(APP_SECRET, None));

        assert_eq!(signature, "wYva/KLlHCNYbufT302ndIUEviE=");
    }

    #[test]
    fn test_signature_known_value_with_query() {
        let query = vec![("search".to_owned(), "Edgar Markov".to_owned())];
        let params = normalize_params(&fixed_params(), &query);
        let base = build_signature_base_string("GET", URL, &params);
        let signature = sign_hmac_sha1(&base, &signature_key(APP_SECRET, None));

        assert_eq!(signature, "H1lDYCBSNfdQJKSzIKn9S3OooX0=");
    }

    #[test]
    fn test_authorization_header_layout() {
        let header = build_authorization_header(URL, &fixed_params(), "c2lnbmF0dXJl=");

        assert_eq!(
            header,
            "OAuth realm=\"https://api.cardmarket.com/ws/v2.0/output.json/route\",\
             oauth_consumer_key=\"xFAKEkFAKEL8FAKE\",\
             oauth_nonce=\"64d1da68f05746329c61c9961f6ead85\",\
             oauth_signature_method=\"HMAC-SHA1\",\
             oauth_timestamp=\"1562565252\",\
             oauth_token=\"\",\
             oauth_version=\"1.0\",\
             oauth_signature=\"c2lnbmF0dXJl=\""
        );
    }
}
