//! Table directory: listing, describing and the create/delete passthroughs.

use futures::future::try_join_all;
use tracing::debug;

use dynamon_http::DynamoDBApi;
use dynamon_model::error::DynamoDBError;
use dynamon_model::input::{
    CreateTableInput, DeleteTableInput, DescribeTableInput, ListTablesInput,
};
use dynamon_model::output::{CreateTableOutput, DeleteTableOutput};
use dynamon_model::types::TableDescription;

/// List every table name, following `LastEvaluatedTableName`.
pub async fn list_table_names(api: &dyn DynamoDBApi) -> Result<Vec<String>, DynamoDBError> {
    let mut names = Vec::new();
    let mut start = None;
    loop {
        let page = api
            .list_tables(ListTablesInput {
                exclusive_start_table_name: start,
                limit: None,
            })
            .await?;
        names.extend(page.table_names);
        match page.last_evaluated_table_name {
            Some(next) => start = Some(next),
            None => break,
        }
    }
    Ok(names)
}

/// Describe one table.
pub async fn describe_table(
    api: &dyn DynamoDBApi,
    table_name: &str,
) -> Result<TableDescription, DynamoDBError> {
    let output = api
        .describe_table(DescribeTableInput {
            table_name: table_name.to_owned(),
        })
        .await?;
    output.table.ok_or_else(|| {
        DynamoDBError::resource_not_found(format!(
            "Requested resource not found: Table: {table_name} not found"
        ))
    })
}

/// Describe every table concurrently.
///
/// Output order follows the listing order. The first failed describe fails
/// the whole listing.
pub async fn list_tables(api: &dyn DynamoDBApi) -> Result<Vec<TableDescription>, DynamoDBError> {
    let names = list_table_names(api).await?;
    debug!(count = names.len(), "describing tables");
    try_join_all(names.iter().map(|name| describe_table(api, name))).await
}

/// Forward a `CreateTable` payload.
pub async fn create_table(
    api: &dyn DynamoDBApi,
    input: CreateTableInput,
) -> Result<CreateTableOutput, DynamoDBError> {
    debug!(table = %input.table_name, "creating table");
    api.create_table(input).await
}

/// Forward a `DeleteTable` payload.
pub async fn delete_table(
    api: &dyn DynamoDBApi,
    input: DeleteTableInput,
) -> Result<DeleteTableOutput, DynamoDBError> {
    debug!(table = %input.table_name, "deleting table");
    api.delete_table(input).await
}
