//! Schema-bound table models and their cache.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use dynamon_http::{DocumentClient, DocumentScanOutput};
use dynamon_model::error::DynamoDBError;
use dynamon_model::input::ScanInput;
use dynamon_model::types::TableDescription;

use crate::connection::Connection;
use crate::error::EngineError;
use crate::expression::FilterExpression;

/// Cache key `table#hash#range`; the range segment is empty for hash-only
/// tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey(String);

impl ModelKey {
    /// Derive the key from a table's key schema.
    pub fn for_table(table: &TableDescription) -> Result<Self, EngineError> {
        let hash = table
            .hash_key()
            .ok_or_else(|| EngineError::MissingHashKey(table.name().to_owned()))?;
        let range = table.range_key().unwrap_or_default();
        Ok(Self(format!("{}#{hash}#{range}", table.name())))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accessor bound to one table's key structure.
#[derive(Debug)]
pub struct TableModel {
    table_name: String,
    hash_key: String,
    range_key: Option<String>,
    documents: Arc<DocumentClient>,
}

impl TableModel {
    /// The table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The partition key attribute.
    #[must_use]
    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    /// The sort key attribute, if any.
    #[must_use]
    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    /// Read one page, optionally filtered.
    pub async fn scan(
        &self,
        filter: Option<FilterExpression>,
        limit: i32,
    ) -> Result<DocumentScanOutput, DynamoDBError> {
        let mut input = ScanInput {
            table_name: self.table_name.clone(),
            limit: Some(limit),
            ..Default::default()
        };
        if let Some(filter) = filter {
            input.filter_expression = Some(filter.expression);
            input.expression_attribute_names = filter.names;
            input.expression_attribute_values = filter.values;
        }
        self.documents.scan(input).await
    }
}

/// Models keyed by [`ModelKey`], never evicted.
#[derive(Debug, Default)]
pub struct ModelCache {
    models: DashMap<ModelKey, Arc<TableModel>>,
}

impl ModelCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or build the model for `table`, reading through `connection`.
    pub fn get_model(
        &self,
        connection: &Connection,
        table: &TableDescription,
    ) -> Result<Arc<TableModel>, EngineError> {
        let key = ModelKey::for_table(table)?;
        match self.models.entry(key) {
            Entry::Occupied(e) => Ok(Arc::clone(e.get())),
            Entry::Vacant(e) => {
                debug!(model = %e.key(), "creating table model");
                let model = Arc::new(TableModel {
                    table_name: table.name().to_owned(),
                    hash_key: table.hash_key().unwrap_or_default().to_owned(),
                    range_key: table.range_key().map(str::to_owned),
                    documents: Arc::clone(&connection.documents),
                });
                e.insert(Arc::clone(&model));
                Ok(model)
            }
        }
    }

    /// Number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use dynamon_model::endpoint::Endpoint;
    use dynamon_model::types::KeySchemaElement;

    use super::*;
    use crate::connection::{ConnectionCache, ConnectionFactory};
    use crate::fake::{FakeDynamoDB, FakeFactory, table};

    fn connection() -> Connection {
        let factory: Arc<dyn ConnectionFactory> = Arc::new(FakeFactory::new(FakeDynamoDB::default()));
        ConnectionCache::new(factory)
            .get_connection(&Endpoint::new("Local", "us-east-1", "http://localhost:8000"))
            .unwrap()
    }

    #[test]
    fn test_should_key_by_table_hash_and_range() {
        let key = ModelKey::for_table(&table("orders", "customerId", Some("createdAt"))).unwrap();
        assert_eq!(key.as_str(), "orders#customerId#createdAt");
    }

    #[test]
    fn test_should_leave_range_segment_empty_for_hash_only_table() {
        let key = ModelKey::for_table(&table("users", "id", None)).unwrap();
        assert_eq!(key.as_str(), "users#id#");
    }

    #[test]
    fn test_should_reject_table_without_hash_key() {
        let mut t = table("broken", "id", None);
        t.key_schema = vec![KeySchemaElement::range("sk")];
        assert!(matches!(
            ModelKey::for_table(&t),
            Err(EngineError::MissingHashKey(name)) if name == "broken"
        ));
    }

    #[test]
    fn test_should_return_same_model_for_same_schema() {
        let cache = ModelCache::new();
        let conn = connection();
        let first = cache
            .get_model(&conn, &table("orders", "customerId", Some("createdAt")))
            .unwrap();
        let second = cache
            .get_model(&conn, &table("orders", "customerId", Some("createdAt")))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.range_key(), Some("createdAt"));
    }

    #[test]
    fn test_should_separate_models_by_range_key() {
        let cache = ModelCache::new();
        let conn = connection();
        let with_range = cache
            .get_model(&conn, &table("orders", "customerId", Some("createdAt")))
            .unwrap();
        let without_range = cache
            .get_model(&conn, &table("orders", "customerId", None))
            .unwrap();

        assert!(!Arc::ptr_eq(&with_range, &without_range));
        assert_eq!(without_range.hash_key(), "customerId");
        assert_eq!(without_range.range_key(), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_should_construct_model_once_under_concurrent_first_access() {
        let cache = Arc::new(ModelCache::new());
        let conn = connection();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let conn = conn.clone();
                std::thread::spawn(move || {
                    cache
                        .get_model(&conn, &table("orders", "customerId", Some("createdAt")))
                        .unwrap()
                })
            })
            .collect();
        let models: Vec<Arc<TableModel>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.len(), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
