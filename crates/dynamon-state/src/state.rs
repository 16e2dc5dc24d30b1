//! The UI-facing snapshot.

use serde::{Deserialize, Serialize};

use dynamon_model::document::Record;
use dynamon_model::endpoint::Endpoint;
use dynamon_model::types::TableDescription;

/// Everything the UI renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamonState {
    /// Configured endpoints.
    pub endpoints: Vec<Endpoint>,
    /// Tables of the selected endpoint; emptied while refetching.
    pub tables: Vec<TableDescription>,
    /// Selected table, always looked up from `tables`.
    pub table: Option<TableDescription>,
    /// Records of the selected table; `None` while refetching.
    pub records: Option<Vec<Record>>,
    /// Set while the endpoint list is loading.
    pub loading_endpoints: bool,
}
