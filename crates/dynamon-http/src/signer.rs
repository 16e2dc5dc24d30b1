//! AWS Signature Version 4 request signing.
//!
//! 1. Add `host`, `x-amz-date` and (for temporary credentials)
//!    `x-amz-security-token` to the request headers.
//! 2. Build the canonical request over all headers present.
//! 3. Build the string to sign from the timestamp, credential scope and
//!    canonical request hash.
//! 4. Derive the signing key with the HMAC-SHA256 chain and sign.
//! 5. Attach the `Authorization` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::canonical::CanonicalRequest;
use crate::credentials::Credentials;
use crate::error::SigningError;

/// The only algorithm this signer produces.
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name in the credential scope.
pub const DYNAMODB_SERVICE: &str = "dynamodb";

type HmacSha256 = Hmac<Sha256>;

/// Signs requests for one region and service.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    region: String,
    service: String,
}

impl SigV4Signer {
    /// A signer for DynamoDB in `region`.
    pub fn new(region: impl Into<String>) -> Self {
        Self::for_service(region, DYNAMODB_SERVICE)
    }

    /// A signer for an arbitrary service.
    pub fn for_service(region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }

    /// Sign a request in place.
    ///
    /// Every header already present is signed, so callers set
    /// `content-type` and `x-amz-target` before calling this.
    pub fn sign(
        &self,
        credentials: &Credentials,
        method: &http::Method,
        uri: &http::Uri,
        headers: &mut http::HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let host = uri
            .authority()
            .ok_or_else(|| SigningError::MissingHost(uri.to_string()))?
            .as_str()
            .to_owned();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        insert_header(headers, http::header::HOST, &host, "host")?;
        insert_header(headers, "x-amz-date", &timestamp, "x-amz-date")?;
        if let Some(token) = &credentials.session_token {
            insert_header(headers, "x-amz-security-token", token, "x-amz-security-token")?;
        }

        let canonical = CanonicalRequest::new(method, uri, headers, &hash_payload(body));
        let canonical_text = canonical.to_string();
        trace!(canonical_request = %canonical_text, "built canonical request");

        let credential_scope = format!(
            "{date}/{}/{}/aws4_request",
            self.region, self.service
        );
        let string_to_sign = build_string_to_sign(
            &timestamp,
            &credential_scope,
            &hex::encode(Sha256::digest(canonical_text.as_bytes())),
        );

        let signing_key = derive_signing_key(
            &credentials.secret_access_key,
            &date,
            &self.region,
            &self.service,
        );
        let signature = compute_signature(&signing_key, &string_to_sign);

        let authorization = format!(
            "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={}, Signature={signature}",
            credentials.access_key_id,
            canonical.signed_headers(),
        );
        insert_header(
            headers,
            http::header::AUTHORIZATION,
            &authorization,
            "authorization",
        )
    }
}

fn insert_header<K: http::header::IntoHeaderName>(
    headers: &mut http::HeaderMap,
    name: K,
    value: &str,
    label: &'static str,
) -> Result<(), SigningError> {
    let value = http::HeaderValue::from_str(value).map_err(|_| SigningError::InvalidHeader(label))?;
    headers.insert(name, value);
    Ok(())
}

/// Build the string to sign.
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, b"aws4_request")
}

/// Hex-encoded HMAC-SHA256 of `data`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a payload.
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
