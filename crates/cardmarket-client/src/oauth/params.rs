//! OAuth protocol parameters and their normalization with query parameters.

use std::collections::BTreeMap;

use super::encode::uri_component_encode;

/// Parameter mapping iterated in ascending byte-wise key order.
pub type ParamMap = BTreeMap<String, String>;

/// OAuth protocol version sent with every request.
pub const OAUTH_VERSION: &str = "1.0";

/// Signature method sent with every request.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol parameters that must appear in every signature base string.
pub const REQUIRED_OAUTH_PARAMS: [&str; 6] = [
    "oauth_version",
    "oauth_timestamp",
    "oauth_nonce",
    "oauth_consumer_key",
    "oauth_token",
    "oauth_signature_method",
];

/// Collect key/value pairs into a mapping sorted by key.
///
/// Keys are compared ordinally, so `"Z"` sorts before `"a"`. A repeated key
/// keeps its last value.
pub fn sort_params<I, K, V>(params: I) -> ParamMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Build the protocol parameter set for one request.
///
/// `token` is rendered as an empty string when the client has no access token.
pub fn oauth_params(
    consumer_key: &str,
    token: Option<&str>,
    timestamp: u64,
    nonce: &str,
) -> ParamMap {
    let timestamp = timestamp.to_string();
    sort_params([
        ("oauth_version", OAUTH_VERSION),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_consumer_key", consumer_key),
        ("oauth_token", token.unwrap_or("")),
    ])
}

/// Merge protocol and query parameters into the set that gets signed.
///
/// Query values overwrite protocol values on key collision, including
/// reserved `oauth_*` names. Required protocol keys missing after the merge
/// are filled with empty strings.
pub fn normalize_params(oauth_params: &ParamMap, query_params: &[(String, String)]) -> ParamMap {
    let mut params = oauth_params.clone();

    for (key, value) in query_params {
        // Query wins, even over protocol keys
        params.insert(key.clone(), value.clone());
    }

    for key in REQUIRED_OAUTH_PARAMS {
        params.entry(key.to_owned()).or_default();
    }

    params
}

/// Join normalized parameters as `key=value` pairs separated by `&`.
///
/// Values use the URI component encoder; keys are emitted verbatim.
pub fn join_params(params: &ParamMap) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", uri_component_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
