//! Engine facade and the intent-to-response bridge.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use dynamon_model::document::Record;
use dynamon_model::endpoint::Endpoint;
use dynamon_model::input::{CreateTableInput, DeleteTableInput};
use dynamon_model::output::{CreateTableOutput, DeleteTableOutput};
use dynamon_model::types::TableDescription;
use dynamon_state::action::{Action, ActionType, ResponseAction, responses};

use crate::config::DynamonConfig;
use crate::connection::{Connection, ConnectionCache, ConnectionFactory, HttpConnectionFactory};
use crate::directory;
use crate::error::EngineError;
use crate::model::{ModelCache, TableModel};
use crate::request::{EngineRequest, TableRequest};
use crate::scan::{self, ScanResult};

/// Entry point for every engine operation.
///
/// Cheap to clone; clones share the caches.
#[derive(Debug, Clone)]
pub struct Engine {
    connections: Arc<ConnectionCache>,
    models: Arc<ModelCache>,
    endpoints: Arc<[Endpoint]>,
}

impl Engine {
    /// Assemble an engine from explicit caches.
    #[must_use]
    pub fn new(
        connections: Arc<ConnectionCache>,
        models: Arc<ModelCache>,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        Self {
            connections,
            models,
            endpoints: endpoints.into(),
        }
    }

    /// An engine with fresh caches over `factory`.
    #[must_use]
    pub fn with_factory(factory: Arc<dyn ConnectionFactory>, endpoints: Vec<Endpoint>) -> Self {
        Self::new(
            Arc::new(ConnectionCache::new(factory)),
            Arc::new(ModelCache::new()),
            endpoints,
        )
    }

    /// An HTTP-backed engine for the configured endpoints.
    pub fn from_config(config: &DynamonConfig) -> Result<Self, EngineError> {
        let endpoints = config.load_endpoints()?;
        info!(count = endpoints.len(), "loaded endpoints");
        Ok(Self::with_factory(Arc::new(HttpConnectionFactory), endpoints))
    }

    /// The configured endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The shared connection cache.
    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionCache> {
        &self.connections
    }

    /// The shared model cache.
    #[must_use]
    pub fn models(&self) -> &Arc<ModelCache> {
        &self.models
    }

    /// The cached connection for `endpoint`'s region.
    pub fn get_connection(&self, endpoint: &Endpoint) -> Result<Connection, EngineError> {
        Ok(self.connections.get_connection(endpoint)?)
    }

    /// The cached model for `table`.
    pub fn get_model(
        &self,
        endpoint: &Endpoint,
        table: &TableDescription,
    ) -> Result<Arc<TableModel>, EngineError> {
        let connection = self.get_connection(endpoint)?;
        self.models.get_model(&connection, table)
    }

    /// Describe every table of `endpoint`, in listing order.
    pub async fn list_tables(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Vec<TableDescription>, EngineError> {
        let connection = self.get_connection(endpoint)?;
        Ok(directory::list_tables(connection.api.as_ref()).await?)
    }

    /// Describe one table.
    pub async fn describe_table(
        &self,
        endpoint: &Endpoint,
        table_name: &str,
    ) -> Result<TableDescription, EngineError> {
        let connection = self.get_connection(endpoint)?;
        Ok(directory::describe_table(connection.api.as_ref(), table_name).await?)
    }

    /// Forward a `CreateTable` payload.
    pub async fn create_table(
        &self,
        request: TableRequest<CreateTableInput>,
    ) -> Result<CreateTableOutput, EngineError> {
        let connection = self.get_connection(&request.endpoint)?;
        Ok(directory::create_table(connection.api.as_ref(), request.table).await?)
    }

    /// Forward a `DeleteTable` payload.
    pub async fn delete_table(
        &self,
        request: TableRequest<DeleteTableInput>,
    ) -> Result<DeleteTableOutput, EngineError> {
        let connection = self.get_connection(&request.endpoint)?;
        Ok(directory::delete_table(connection.api.as_ref(), request.table).await?)
    }

    /// First page of a table, unfiltered.
    pub async fn list_records(&self, request: &EngineRequest) -> Result<ScanResult, EngineError> {
        let table_name = request.resolved_table_name()?;
        let connection = self.get_connection(&request.endpoint)?;
        scan::list_records(&connection.documents, table_name).await
    }

    /// First page of a table filtered by the request's conditions.
    ///
    /// A request naming the table without its description is described
    /// first, since the model is bound to the key schema.
    pub async fn scan(&self, request: &EngineRequest) -> Result<ScanResult, EngineError> {
        let described;
        let table = match &request.table {
            Some(table) => table,
            None => {
                let name = request.resolved_table_name()?;
                described = self.describe_table(&request.endpoint, name).await?;
                &described
            }
        };
        let model = self.get_model(&request.endpoint, table)?;
        let conditions = request.conditions.as_deref().unwrap_or_default();
        scan::scan(&model, conditions).await
    }

    /// Key-condition query. Declared, not implemented.
    pub async fn query(&self, request: &EngineRequest) -> Result<Vec<Record>, EngineError> {
        let table = request.require_table()?;
        let model = self.get_model(&request.endpoint, table)?;
        debug!(table = %model.table_name(), "query requested");
        Err(EngineError::Unsupported("query".to_owned()))
    }

    /// Serve an intent.
    ///
    /// Universal intents are local to the UI and produce no response.
    pub async fn handle(&self, action: &Action) -> Result<Option<ResponseAction>, EngineError> {
        let Some(kind) = action.kind() else {
            return Err(EngineError::Unsupported(action.action_type.clone()));
        };
        if action.universal {
            return Ok(None);
        }
        debug!(action = %kind, "handling action");

        let response = match kind {
            ActionType::ReadEndpoints => responses::read_endpoints(&self.endpoints),
            ActionType::ReadTables => {
                let endpoint: Endpoint = decode(action)?;
                responses::read_tables(&self.list_tables(&endpoint).await?)
            }
            ActionType::ReadTable => {
                let request: EngineRequest = decode(action)?;
                let table = self
                    .describe_table(&request.endpoint, request.resolved_table_name()?)
                    .await?;
                responses::read_table(&table)
            }
            ActionType::ReadRecords => {
                let request: EngineRequest = decode(action)?;
                let filtered = request.conditions.as_ref().is_some_and(|c| !c.is_empty());
                let page = if filtered {
                    self.scan(&request).await?
                } else {
                    self.list_records(&request).await?
                };
                responses::read_records(&page.items)
            }
            ActionType::CreateTable => {
                let output = self.create_table(decode(action)?).await?;
                encode(kind, &output)?
            }
            ActionType::DeleteTable => {
                let output = self.delete_table(decode(action)?).await?;
                encode(kind, &output)?
            }
            _ => return Err(EngineError::Unsupported(kind.as_str().to_owned())),
        };
        Ok(Some(response))
    }
}

fn encode<T: Serialize>(kind: ActionType, output: &T) -> Result<ResponseAction, EngineError> {
    let payload = serde_json::to_value(output).map_err(|source| EngineError::Encode {
        action: kind.as_str().to_owned(),
        source,
    })?;
    Ok(ResponseAction::new(kind, Some(payload)))
}

fn decode<T: DeserializeOwned>(action: &Action) -> Result<T, EngineError> {
    action
        .payload_as()
        .map_err(|source| EngineError::InvalidPayload {
            action: action.action_type.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use dynamon_model::attribute_value::AttributeValue;
    use dynamon_model::condition::{Condition, ConditionOperator};
    use dynamon_model::document::Item;
    use dynamon_state::action::actions;
    use dynamon_state::store::Store;
    use serde_json::json;

    use super::*;
    use crate::fake::{FakeDynamoDB, FakeFactory, table};

    fn local() -> Endpoint {
        Endpoint::new("Local", "us-east-1", "http://localhost:8000")
    }

    fn engine(api: FakeDynamoDB) -> (Arc<FakeFactory>, Engine) {
        let factory = Arc::new(FakeFactory::new(api));
        let engine = Engine::with_factory(
            Arc::clone(&factory) as Arc<dyn ConnectionFactory>,
            vec![local()],
        );
        (factory, engine)
    }

    fn user(id: &str, age: u32) -> Item {
        [
            ("id".to_owned(), AttributeValue::from(id)),
            ("age".to_owned(), AttributeValue::number(age)),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_should_answer_read_endpoints_with_configuration() {
        let (_, engine) = engine(FakeDynamoDB::default());
        let response = engine.handle(&actions::read_endpoints()).await.unwrap().unwrap();
        assert_eq!(response.kind(), Some(ActionType::ReadEndpoints));
        assert!(response.response);
        assert_eq!(response.payload_as::<Vec<Endpoint>>().unwrap(), vec![local()]);
    }

    #[tokio::test]
    async fn test_should_not_answer_universal_intent() {
        let (factory, engine) = engine(FakeDynamoDB::default());
        assert!(engine.handle(&actions::set_table("users")).await.unwrap().is_none());
        assert_eq!(factory.connects(), 0);
    }

    #[tokio::test]
    async fn test_should_scan_with_translated_filter() {
        let (factory, engine) = engine(
            FakeDynamoDB::default()
                .with_table(table("users", "id", None))
                .with_items(vec![user("u1", 31)]),
        );

        let action = actions::read_records(
            &local(),
            "users",
            &[
                serde_json::from_value::<Condition>(json!({"property": "nick", "operator": "eq"}))
                    .unwrap(),
                Condition::new("age", ConditionOperator::Gt, "30", Some("N")),
            ],
        );
        let response = engine.handle(&action).await.unwrap().unwrap();

        let records: Vec<Record> = response.payload_as().unwrap();
        assert_eq!(serde_json::Value::Object(records[0].clone()), json!({"id": "u1", "age": 31}));

        let scans = factory.api().scans();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].filter_expression.as_deref(), Some("#f0 > :v0"));
        assert_eq!(scans[0].expression_attribute_names["#f0"], "age");
        assert_eq!(
            scans[0].expression_attribute_values[":v0"],
            AttributeValue::N("30".to_owned())
        );
        assert_eq!(scans[0].limit, Some(crate::scan::SCAN_PAGE_SIZE));
    }

    #[tokio::test]
    async fn test_should_list_records_without_conditions() {
        let (factory, engine) = engine(FakeDynamoDB::default().with_items(vec![user("u1", 20)]));
        let response = engine
            .handle(&actions::read_records(&local(), "users", &[]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.payload_as::<Vec<Record>>().unwrap().len(), 1);
        assert!(factory.api().scans()[0].filter_expression.is_none());
    }

    #[tokio::test]
    async fn test_should_reuse_model_across_scans() {
        let (_, engine) = engine(FakeDynamoDB::default());
        let mut request = EngineRequest::new(local());
        request.table = Some(table("orders", "customerId", Some("createdAt")));
        request.conditions = Some(vec![Condition::new(
            "status",
            ConditionOperator::Eq,
            "open",
            None,
        )]);

        engine.scan(&request).await.unwrap();
        engine.scan(&request).await.unwrap();

        let first = engine.get_model(&local(), request.table.as_ref().unwrap()).unwrap();
        let second = engine.get_model(&local(), request.table.as_ref().unwrap()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.models().len(), 1);
    }

    #[tokio::test]
    async fn test_should_share_connection_between_endpoints_of_one_region() {
        let (factory, engine) = engine(FakeDynamoDB::default().with_table(table("a", "id", None)));
        engine.list_tables(&local()).await.unwrap();
        engine
            .list_tables(&Endpoint::new("Other", "us-east-1", "http://elsewhere:8000"))
            .await
            .unwrap();
        assert_eq!(factory.connects(), 1);
        assert_eq!(engine.connections().len(), 1);
    }

    #[tokio::test]
    async fn test_should_report_query_as_unsupported() {
        let (_, engine) = engine(FakeDynamoDB::default());
        let mut request = EngineRequest::new(local());
        request.table = Some(table("users", "id", None));
        assert!(matches!(
            engine.query(&request).await,
            Err(EngineError::Unsupported(op)) if op == "query"
        ));
    }

    #[tokio::test]
    async fn test_should_reject_unimplemented_vocabulary() {
        let (_, engine) = engine(FakeDynamoDB::default());
        let result = engine
            .handle(&actions::create_record("users", json!({"id": "u1"})))
            .await;
        assert!(matches!(result, Err(EngineError::Unsupported(tag)) if tag == "create record"));
    }

    #[tokio::test]
    async fn test_should_reject_malformed_payload() {
        let (_, engine) = engine(FakeDynamoDB::default());
        let action = Action::new(false, ActionType::ReadTables, Some(json!("nope")));
        assert!(matches!(
            engine.handle(&action).await,
            Err(EngineError::InvalidPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_should_forward_create_table_payload() {
        let (factory, engine) = engine(FakeDynamoDB::default());
        let action = Action::new(
            false,
            ActionType::CreateTable,
            Some(json!({
                "endpoint": {"name": "Local", "region": "us-east-1", "endpoint": "http://localhost:8000"},
                "table": {
                    "TableName": "events",
                    "KeySchema": [{"AttributeName": "id", "KeyType": "HASH"}],
                    "AttributeDefinitions": [{"AttributeName": "id", "AttributeType": "S"}],
                    "BillingMode": "PAY_PER_REQUEST"
                }
            })),
        );

        let response = engine.handle(&action).await.unwrap().unwrap();
        assert_eq!(response.kind(), Some(ActionType::CreateTable));
        assert_eq!(
            response.payload.unwrap()["TableDescription"]["TableName"],
            "events"
        );
        assert_eq!(factory.api().created()[0].table_name, "events");
    }

    #[test]
    fn test_should_report_unencodable_response_payload() {
        let output: std::collections::HashMap<(i32, i32), i32> = [((1, 2), 3)].into();
        assert!(matches!(
            encode(ActionType::CreateTable, &output),
            Err(EngineError::Encode { action, .. }) if action == "create table"
        ));
    }

    #[tokio::test]
    async fn test_should_drive_store_through_round_trip() {
        let (_, engine) = engine(
            FakeDynamoDB::default()
                .with_table(table("A", "id", None))
                .with_table(table("B", "id", None)),
        );
        let store = Store::default();

        let intent = actions::read_tables(&local());
        store.dispatch(&intent.clone().into());
        let response = engine.handle(&intent).await.unwrap().unwrap();
        store.dispatch(&response.into());
        store.dispatch(&actions::set_table("B").into());

        let state = store.state();
        assert_eq!(state.tables.len(), 2);
        assert_eq!(state.table.as_ref().map(TableDescription::name), Some("B"));
    }
}
