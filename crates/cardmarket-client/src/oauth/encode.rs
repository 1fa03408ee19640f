//! Percent-encoding for OAuth signing and query strings.
//!
//! Two encoders are needed and must stay distinct: OAuth signing uses the
//! strict RFC 3986 set, while query values in URLs and inside the joined
//! parameter string use the looser URI component set that leaves
//! `! * ' ( )` unescaped.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// URI component unreserved characters: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const URI_COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode string per RFC 3986.
pub fn oauth_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Percent-encode a URI component (query keys and values).
pub fn uri_component_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT_ENCODE_SET).to_string()
}
