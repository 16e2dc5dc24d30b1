//! In-memory DynamoDB double for engine tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use dynamon_http::DynamoDBApi;
use dynamon_model::document::Item;
use dynamon_model::endpoint::ClientOptions;
use dynamon_model::error::DynamoDBError;
use dynamon_model::input::{
    CreateTableInput, DeleteTableInput, DescribeTableInput, ListTablesInput, ScanInput,
};
use dynamon_model::output::{
    CreateTableOutput, DeleteTableOutput, DescribeTableOutput, ListTablesOutput, ScanOutput,
};
use dynamon_model::types::{KeySchemaElement, TableDescription, TableStatus};

use crate::connection::ConnectionFactory;

/// Build a table description with the given keys.
pub(crate) fn table(name: &str, hash: &str, range: Option<&str>) -> TableDescription {
    let mut key_schema = vec![KeySchemaElement::hash(hash)];
    if let Some(range) = range {
        key_schema.push(KeySchemaElement::range(range));
    }
    TableDescription {
        table_name: Some(name.to_owned()),
        table_status: Some(TableStatus::Active),
        key_schema,
        ..Default::default()
    }
}

/// Records every call and answers from fixed data.
#[derive(Debug, Default)]
pub(crate) struct FakeDynamoDB {
    tables: Vec<TableDescription>,
    describe_delays: HashMap<String, Duration>,
    failing_describe: Option<String>,
    items: Vec<Item>,
    scans: Mutex<Vec<ScanInput>>,
    created: Mutex<Vec<CreateTableInput>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeDynamoDB {
    pub(crate) fn with_table(mut self, table: TableDescription) -> Self {
        self.tables.push(table);
        self
    }

    pub(crate) fn with_describe_delay(mut self, name: &str, millis: u64) -> Self {
        self.describe_delays
            .insert(name.to_owned(), Duration::from_millis(millis));
        self
    }

    pub(crate) fn failing_describe(mut self, name: &str) -> Self {
        self.failing_describe = Some(name.to_owned());
        self
    }

    pub(crate) fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub(crate) fn scans(&self) -> Vec<ScanInput> {
        self.scans.lock().clone()
    }

    pub(crate) fn created(&self) -> Vec<CreateTableInput> {
        self.created.lock().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl DynamoDBApi for FakeDynamoDB {
    async fn list_tables(&self, _input: ListTablesInput) -> Result<ListTablesOutput, DynamoDBError> {
        Ok(ListTablesOutput {
            table_names: self.tables.iter().map(|t| t.name().to_owned()).collect(),
            last_evaluated_table_name: None,
        })
    }

    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, DynamoDBError> {
        if let Some(delay) = self.describe_delays.get(&input.table_name) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_describe.as_deref() == Some(input.table_name.as_str()) {
            return Err(DynamoDBError::resource_not_found(format!(
                "Requested resource not found: Table: {} not found",
                input.table_name
            )));
        }
        let table = self
            .tables
            .iter()
            .find(|t| t.name() == input.table_name)
            .cloned()
            .ok_or_else(|| DynamoDBError::resource_not_found(input.table_name.clone()))?;
        Ok(DescribeTableOutput { table: Some(table) })
    }

    async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, DynamoDBError> {
        let description = table(
            &input.table_name,
            input
                .key_schema
                .first()
                .map_or("id", |k| k.attribute_name.as_str()),
            None,
        );
        self.created.lock().push(input);
        Ok(CreateTableOutput {
            table_description: Some(description),
        })
    }

    async fn delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, DynamoDBError> {
        self.deleted.lock().push(input.table_name.clone());
        Ok(DeleteTableOutput {
            table_description: Some(table(&input.table_name, "id", None)),
        })
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, DynamoDBError> {
        self.scans.lock().push(input);
        let count = i32::try_from(self.items.len()).unwrap_or(i32::MAX);
        Ok(ScanOutput {
            items: self.items.clone(),
            count,
            scanned_count: count,
            last_evaluated_key: HashMap::new(),
        })
    }
}

/// Hands out the shared fake and counts constructions.
#[derive(Debug)]
pub(crate) struct FakeFactory {
    api: Arc<FakeDynamoDB>,
    connects: AtomicUsize,
    options: Mutex<Vec<ClientOptions>>,
    fail_next: AtomicBool,
}

impl FakeFactory {
    pub(crate) fn new(api: FakeDynamoDB) -> Self {
        Self {
            api: Arc::new(api),
            connects: AtomicUsize::new(0),
            options: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub(crate) fn api(&self) -> &FakeDynamoDB {
        &self.api
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn options(&self) -> Vec<ClientOptions> {
        self.options.lock().clone()
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl ConnectionFactory for FakeFactory {
    fn connect(&self, options: &ClientOptions) -> Result<Arc<dyn DynamoDBApi>, DynamoDBError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DynamoDBError::validation("invalid endpoint"));
        }
        // Widen the window for racing first callers.
        std::thread::sleep(Duration::from_millis(5));
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.options.lock().push(options.clone());
        Ok(Arc::clone(&self.api) as Arc<dyn DynamoDBApi>)
    }
}
