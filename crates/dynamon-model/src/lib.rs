//! DynamoDB model types for Dynamon.
//!
//! Hand-written serde types for the slice of the DynamoDB JSON protocol an
//! administrative client needs (table directory and scans), plus the
//! client-side vocabulary shared by the engine and the UI state: endpoints,
//! scan conditions and plain document records.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod condition;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use condition::{Condition, ConditionError, ConditionOperator, FilterCondition};
pub use document::{Item, Record};
pub use endpoint::{ClientOptions, Endpoint};
pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use operations::DynamoDBOperation;
pub use types::TableDescription;
