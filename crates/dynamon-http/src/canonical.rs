//! Canonical request construction for AWS Signature Version 4.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved characters is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A request reduced to the parts that are signed.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    /// Lowercase name -> normalized value, sorted.
    headers: BTreeMap<String, String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build a canonical request.
    ///
    /// Every header in `headers` is signed. Values of repeated names are
    /// joined with commas.
    #[must_use]
    pub fn new(
        method: &http::Method,
        uri: &http::Uri,
        headers: &http::HeaderMap,
        payload_hash: &str,
    ) -> Self {
        let mut canonical_headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = collapse_whitespace(String::from_utf8_lossy(value.as_bytes()).trim());
            canonical_headers
                .entry(name.as_str().to_owned())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            method: method.as_str().to_owned(),
            uri: canonical_uri(uri.path()),
            query: canonical_query_string(uri.query().unwrap_or_default()),
            headers: canonical_headers,
            payload_hash: payload_hash.to_owned(),
        }
    }

    /// The `SignedHeaders` value: sorted lowercase names joined by `;`.
    #[must_use]
    pub fn signed_headers(&self) -> String {
        self.headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        f.write_str(&self.payload_hash)
    }
}

/// Encode each path segment, keeping the slashes. Empty paths become `/`.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, URI_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort parameters by key, then value.
fn canonical_query_string(query: &str) -> String {
    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();
    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
