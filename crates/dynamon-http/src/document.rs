//! High-level document client.
//!
//! Shares the low-level client and returns rows as plain JSON records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dynamon_model::document::{Record, unwrap_item};
use dynamon_model::error::DynamoDBError;
use dynamon_model::input::ScanInput;

use crate::client::DynamoDBApi;

/// One page of scan results with rows unwrapped into records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentScanOutput {
    /// Matching rows.
    pub items: Vec<Record>,
    /// Number of rows returned.
    pub count: i32,
    /// Number of rows read before filtering.
    pub scanned_count: i32,
    /// Key of the last row read when more pages remain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<Record>,
}

/// Reads documents through a shared low-level client.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    api: Arc<dyn DynamoDBApi>,
}

impl DocumentClient {
    /// Wrap a low-level client.
    #[must_use]
    pub fn new(api: Arc<dyn DynamoDBApi>) -> Self {
        Self { api }
    }

    /// The low-level client this document client reads through.
    #[must_use]
    pub fn api(&self) -> &Arc<dyn DynamoDBApi> {
        &self.api
    }

    /// Run one scan page and unwrap the rows.
    pub async fn scan(&self, input: ScanInput) -> Result<DocumentScanOutput, DynamoDBError> {
        let table = input.table_name.clone();
        let output = self.api.scan(input).await?;
        debug!(table = %table, count = output.count, scanned = output.scanned_count, "scan page read");

        let last_evaluated_key = if output.last_evaluated_key.is_empty() {
            None
        } else {
            Some(unwrap_item(&output.last_evaluated_key))
        };

        Ok(DocumentScanOutput {
            items: output.items.iter().map(unwrap_item).collect(),
            count: output.count,
            scanned_count: output.scanned_count,
            last_evaluated_key,
        })
    }
}
