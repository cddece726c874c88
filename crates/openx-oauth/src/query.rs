//! Percent-encoding helpers and form/query-string parsing.

use std::borrow::Cow;
use std::collections::HashMap;

/// Marker the SSO server prepends to out-of-band login responses.
const OOB_MARKER: &str = "oob?";

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~` is escaped.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
    urlencoding::encode(input)
}

/// Decode a form-encoded component (`+` is a space).
pub fn form_decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // Invalid UTF-8 after decoding: keep the raw component.
        Err(_) => spaced,
    }
}

/// Split a query string into a map.
///
/// Every `oob?` is removed first. Pairs split on the first `=`; a pair with
/// no `=` maps to an empty value. When a key repeats the first value wins.
pub fn split_query_string(query: &str) -> HashMap<String, String> {
    let cleaned = query.replace(OOB_MARKER, "");
    let mut params = HashMap::new();

    for pair in cleaned.trim().split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(form_decode(key))
            .or_insert_with(|| form_decode(value));
    }

    params
}

/// Form-encode pairs as an `application/x-www-form-urlencoded` body.
pub fn encode_form(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
