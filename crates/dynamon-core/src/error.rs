//! Engine error type.

use dynamon_model::condition::ConditionError;
use dynamon_model::error::DynamoDBError;

/// Errors surfaced by engine operations.
///
/// Provider failures are carried verbatim; nothing is retried or translated.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An error reported by DynamoDB or the transport.
    #[error(transparent)]
    Provider(#[from] DynamoDBError),

    /// A scan condition could not be resolved.
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// The table's key schema has no `HASH` entry.
    #[error("table {0} has no HASH key")]
    MissingHashKey(String),

    /// The request names no table.
    #[error("request does not name a table")]
    MissingTable,

    /// An action payload did not have the expected shape.
    #[error("invalid payload for {action}: {source}")]
    InvalidPayload {
        /// The action type tag.
        action: String,
        /// The decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A provider result could not be encoded as a response payload.
    #[error("failed to encode {action} response: {source}")]
    Encode {
        /// The action type tag.
        action: String,
        /// The encode error.
        #[source]
        source: serde_json::Error,
    },

    /// The operation is declared but not implemented.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}
