//! Pure state reducer.
//!
//! Responses are folded first; a response the response path does not
//! recognize (or whose payload does not decode) is retried through the
//! intent path. Each path reports whether it matched, and the root hands
//! back the same `Arc` when nothing did.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use dynamon_model::document::Record;
use dynamon_model::endpoint::Endpoint;
use dynamon_model::types::TableDescription;

use crate::action::{ActionType, Message};
use crate::state::DynamonState;

/// Tags starting with this belong to the hosting framework and are ignored.
pub const RESERVED_PREFIX: char = '@';

/// Outcome of one reducer path.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    /// The path handled the message.
    Changed(DynamonState),
    /// The path does not handle this message.
    Unmatched,
}

/// Fold a message into the state.
#[must_use]
pub fn reduce(state: &Arc<DynamonState>, message: &Message) -> Arc<DynamonState> {
    let tag = message.action_type();
    if tag.starts_with(RESERVED_PREFIX) {
        return Arc::clone(state);
    }

    let mut reduction = Reduction::Unmatched;
    if message.is_response() {
        reduction = reduce_response(state, tag, message.payload());
    }
    if reduction == Reduction::Unmatched {
        reduction = reduce_intent(state, tag, message.payload());
    }

    match reduction {
        Reduction::Changed(next) => {
            debug!(action = tag, response = message.is_response(), "state changed");
            Arc::new(next)
        }
        Reduction::Unmatched => Arc::clone(state),
    }
}

/// The intent path.
#[must_use]
pub fn reduce_intent(state: &DynamonState, tag: &str, payload: Option<&Value>) -> Reduction {
    let Some(kind) = ActionType::from_tag(tag) else {
        return Reduction::Unmatched;
    };

    match kind {
        ActionType::SetTable => with_payload::<Option<String>>(tag, payload, |name| {
            let table = name.and_then(|name| {
                state
                    .tables
                    .iter()
                    .find(|t| t.table_name.as_deref() == Some(name.as_str()))
                    .cloned()
            });
            DynamonState {
                table,
                ..state.clone()
            }
        }),
        ActionType::ReadEndpoints => Reduction::Changed(DynamonState {
            loading_endpoints: true,
            ..state.clone()
        }),
        ActionType::ReadRecords => Reduction::Changed(DynamonState {
            records: None,
            ..state.clone()
        }),
        ActionType::ReadTables => Reduction::Changed(DynamonState {
            tables: Vec::new(),
            ..state.clone()
        }),
        _ => Reduction::Unmatched,
    }
}

/// The response path.
#[must_use]
pub fn reduce_response(state: &DynamonState, tag: &str, payload: Option<&Value>) -> Reduction {
    let Some(kind) = ActionType::from_tag(tag) else {
        return Reduction::Unmatched;
    };

    match kind {
        ActionType::ReadEndpoints => with_payload::<Vec<Endpoint>>(tag, payload, |endpoints| {
            DynamonState {
                endpoints,
                loading_endpoints: false,
                ..state.clone()
            }
        }),
        ActionType::ReadTables => {
            with_payload::<Vec<TableDescription>>(tag, payload, |tables| DynamonState {
                tables,
                ..state.clone()
            })
        }
        ActionType::ReadRecords => {
            with_payload::<Option<Vec<Record>>>(tag, payload, |records| DynamonState {
                records,
                ..state.clone()
            })
        }
        _ => Reduction::Unmatched,
    }
}

fn with_payload<T: DeserializeOwned>(
    tag: &str,
    payload: Option<&Value>,
    apply: impl FnOnce(T) -> DynamonState,
) -> Reduction {
    let decoded = match payload {
        Some(value) => T::deserialize(value),
        None => T::deserialize(Value::Null),
    };
    match decoded {
        Ok(value) => Reduction::Changed(apply(value)),
        Err(e) => {
            warn!(action = tag, error = %e, "dropping message with malformed payload");
            Reduction::Unmatched
        }
    }
}
