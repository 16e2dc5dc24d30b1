//! Signing errors.

/// Errors raised while signing a request.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// No credentials were available.
    #[error("No credentials available for signing")]
    MissingCredentials,

    /// The AWS provider chain could not resolve credentials.
    #[error("Credential provider failed: {0}")]
    Provider(#[source] aws_credential_types::provider::error::CredentialsError),

    /// The request URL has no host to sign.
    #[error("Request URL has no host: {0}")]
    MissingHost(String),

    /// A computed header value is not valid in HTTP.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}
