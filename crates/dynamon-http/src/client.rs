//! The provider boundary.

use std::fmt;

use async_trait::async_trait;

use dynamon_model::error::DynamoDBError;
use dynamon_model::input::{
    CreateTableInput, DeleteTableInput, DescribeTableInput, ListTablesInput, ScanInput,
};
use dynamon_model::output::{
    CreateTableOutput, DeleteTableOutput, DescribeTableOutput, ListTablesOutput, ScanOutput,
};

/// Low-level DynamoDB operations the engine depends on.
///
/// Errors are the provider's own, carried verbatim.
#[async_trait]
pub trait DynamoDBApi: Send + Sync + fmt::Debug {
    /// `ListTables`.
    async fn list_tables(&self, input: ListTablesInput) -> Result<ListTablesOutput, DynamoDBError>;

    /// `DescribeTable`.
    async fn describe_table(
        &self,
        input: DescribeTableInput,
    ) -> Result<DescribeTableOutput, DynamoDBError>;

    /// `CreateTable`.
    async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, DynamoDBError>;

    /// `DeleteTable`.
    async fn delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, DynamoDBError>;

    /// `Scan`.
    async fn scan(&self, input: ScanInput) -> Result<ScanOutput, DynamoDBError>;
}
