//! Dynamon engine.
//!
//! Resolves connections and table models through explicit caches, turns UI
//! condition lists into filtered scans, lists and describes tables, and
//! bridges intent actions to response actions.
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod connection;
pub mod directory;
pub mod engine;
pub mod error;
pub mod expression;
pub mod model;
pub mod request;
pub mod scan;

#[cfg(test)]
pub(crate) mod fake;

pub use config::DynamonConfig;
pub use connection::{Connection, ConnectionCache, ConnectionFactory, HttpConnectionFactory};
pub use engine::Engine;
pub use error::EngineError;
pub use model::{ModelCache, ModelKey, TableModel};
pub use request::{EngineRequest, TableRequest};
pub use scan::{SCAN_PAGE_SIZE, ScanResult};
