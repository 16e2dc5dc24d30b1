//! DynamoDB error types.
//!
//! The provider reports failures as JSON with a `__type` field holding the
//! fully-qualified error name (for example
//! `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException`) and a
//! `message` (sometimes `Message`). The client surfaces these verbatim.

use std::fmt;

/// Well-known DynamoDB error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum DynamoDBErrorCode {
    /// Table already exists or is being modified.
    ResourceInUseException,
    /// Table not found.
    ResourceNotFoundException,
    /// Validation error (bad expression, bad key schema, ...).
    #[default]
    ValidationException,
    /// The request body could not be parsed.
    SerializationException,
    /// Provisioned throughput exceeded.
    ProvisionedThroughputExceededException,
    /// Account-level request limit exceeded.
    RequestLimitExceeded,
    /// Control-plane throttling.
    ThrottlingException,
    /// Too many concurrent control-plane operations.
    LimitExceededException,
    /// Access denied.
    AccessDeniedException,
    /// Unknown access key or operation.
    UnrecognizedClientException,
    /// Request was not signed.
    MissingAuthenticationTokenException,
    /// Internal server error, also used for transport failures.
    InternalServerError,
    /// Service unavailable.
    ServiceUnavailable,
    /// Any code not listed above; the raw name is kept on the error.
    Unknown,
}

impl DynamoDBErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceInUseException => "ResourceInUseException",
            Self::ResourceNotFoundException => "ResourceNotFoundException",
            Self::ValidationException => "ValidationException",
            Self::SerializationException => "SerializationException",
            Self::ProvisionedThroughputExceededException => {
                "ProvisionedThroughputExceededException"
            }
            Self::RequestLimitExceeded => "RequestLimitExceeded",
            Self::ThrottlingException => "ThrottlingException",
            Self::LimitExceededException => "LimitExceededException",
            Self::AccessDeniedException => "AccessDeniedException",
            Self::UnrecognizedClientException => "UnrecognizedClientException",
            Self::MissingAuthenticationTokenException => "MissingAuthenticationTokenException",
            Self::InternalServerError => "InternalServerError",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a short error name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ResourceInUseException" => Self::ResourceInUseException,
            "ResourceNotFoundException" => Self::ResourceNotFoundException,
            "ValidationException" => Self::ValidationException,
            "SerializationException" => Self::SerializationException,
            "ProvisionedThroughputExceededException" => {
                Self::ProvisionedThroughputExceededException
            }
            "RequestLimitExceeded" => Self::RequestLimitExceeded,
            "ThrottlingException" => Self::ThrottlingException,
            "LimitExceededException" => Self::LimitExceededException,
            "AccessDeniedException" => Self::AccessDeniedException,
            "UnrecognizedClientException" => Self::UnrecognizedClientException,
            "MissingAuthenticationTokenException" => Self::MissingAuthenticationTokenException,
            "InternalServerError" | "InternalFailure" => Self::InternalServerError,
            "ServiceUnavailable" => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DynamoDBErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DynamoDB error as reported by the provider (or by the transport).
#[derive(Debug)]
pub struct DynamoDBError {
    /// The error code.
    pub code: DynamoDBErrorCode,
    /// The short error name exactly as reported (differs from `code` only for
    /// `Unknown`).
    pub error_type: String,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code of the response.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for DynamoDBError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamoDBError({}): {}", self.error_type, self.message)
    }
}

impl std::error::Error for DynamoDBError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(serde::Deserialize)]
struct WireError {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

impl DynamoDBError {
    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: DynamoDBErrorCode, message: impl Into<String>) -> Self {
        let status_code = match code {
            DynamoDBErrorCode::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            DynamoDBErrorCode::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            _ => http::StatusCode::BAD_REQUEST,
        };
        Self {
            code,
            error_type: code.as_str().to_owned(),
            message: message.into(),
            status_code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Decode an error response body.
    ///
    /// Bodies that are not the documented JSON shape still produce an error
    /// carrying the status and the raw text.
    #[must_use]
    pub fn from_response(status_code: http::StatusCode, body: &[u8]) -> Self {
        let Ok(wire) = serde_json::from_slice::<WireError>(body) else {
            let mut err = Self::with_message(
                DynamoDBErrorCode::Unknown,
                String::from_utf8_lossy(body).into_owned(),
            );
            err.status_code = status_code;
            return err;
        };

        let short = wire
            .error_type
            .rsplit_once('#')
            .map_or(wire.error_type.as_str(), |(_, name)| name);

        Self {
            code: DynamoDBErrorCode::from_name(short),
            error_type: short.to_owned(),
            message: wire.message,
            status_code,
            source: None,
        }
    }

    /// Transport-level failure (connection refused, TLS, malformed body).
    #[must_use]
    pub fn transport(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::with_message(DynamoDBErrorCode::InternalServerError, source.to_string())
            .with_source(source)
    }

    /// Table or resource not found.
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::ResourceNotFoundException, message)
    }

    /// Validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(DynamoDBErrorCode::ValidationException, message)
    }
}
