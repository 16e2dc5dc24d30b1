//! Engine request parameters.

use serde::{Deserialize, Serialize};

use dynamon_model::condition::Condition;
use dynamon_model::endpoint::Endpoint;
use dynamon_model::types::TableDescription;

use crate::error::EngineError;

/// Parameters shared by the read operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequest {
    /// Where to connect.
    pub endpoint: Endpoint,
    /// The table, as previously described.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableDescription>,
    /// The table by name, when no description is at hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Scan conditions, ANDed in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

impl EngineRequest {
    /// A request for `endpoint` with nothing else set.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            table: None,
            table_name: None,
            conditions: None,
        }
    }

    /// Name of the addressed table: `tableName`, else the description's.
    pub fn resolved_table_name(&self) -> Result<&str, EngineError> {
        self.table_name
            .as_deref()
            .or_else(|| self.table.as_ref().and_then(|t| t.table_name.as_deref()))
            .filter(|name| !name.is_empty())
            .ok_or(EngineError::MissingTable)
    }

    /// The table description, required by schema-bound operations.
    pub fn require_table(&self) -> Result<&TableDescription, EngineError> {
        self.table.as_ref().ok_or(EngineError::MissingTable)
    }
}

/// Parameters of the table passthroughs: a provider-shaped payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRequest<T> {
    /// Where to connect.
    pub endpoint: Endpoint,
    /// Forwarded unchanged.
    pub table: T,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_decode_camel_case_request() {
        let req: EngineRequest = serde_json::from_value(json!({
            "endpoint": {"name": "Local", "region": "us-east-1", "endpoint": "http://localhost:8000"},
            "tableName": "users",
            "conditions": [{"property": "age", "operator": "gt", "value": "30", "type": "N"}]
        }))
        .unwrap();

        assert_eq!(req.resolved_table_name().unwrap(), "users");
        assert_eq!(req.conditions.as_ref().map(Vec::len), Some(1));
        assert!(req.require_table().is_err());
    }

    #[test]
    fn test_should_fall_back_to_description_name() {
        let req: EngineRequest = serde_json::from_value(json!({
            "endpoint": {"region": "us-east-1"},
            "table": {"TableName": "orders", "KeySchema": [{"AttributeName": "id", "KeyType": "HASH"}]}
        }))
        .unwrap();
        assert_eq!(req.resolved_table_name().unwrap(), "orders");
    }

    #[test]
    fn test_should_require_some_table() {
        let req = EngineRequest::new(Endpoint::new("Local", "us-east-1", ""));
        assert!(matches!(
            req.resolved_table_name(),
            Err(EngineError::MissingTable)
        ));
    }
}
