//! Scan translation.
//!
//! A UI condition list becomes one filtered scan page: inert conditions are
//! skipped, `type: "N"` values are coerced to numbers, and the rest are ANDed
//! in list order.

use tracing::debug;

use dynamon_http::{DocumentClient, DocumentScanOutput};
use dynamon_model::condition::Condition;
use dynamon_model::input::ScanInput;

use crate::error::EngineError;
use crate::expression::{FilterBuilder, FilterExpression};
use crate::model::TableModel;

/// Rows read per scan; only the first page is returned.
pub const SCAN_PAGE_SIZE: i32 = 100;

/// One page of records with scan metadata.
pub type ScanResult = DocumentScanOutput;

/// Translate conditions into a filter, or `None` when all are inert.
pub fn translate_conditions(
    conditions: &[Condition],
) -> Result<Option<FilterExpression>, EngineError> {
    let mut builder = FilterBuilder::new();
    for condition in conditions {
        match condition.resolve()? {
            Some(resolved) => {
                builder.push(&resolved);
            }
            None => debug!(property = ?condition.property, "skipping inert condition"),
        }
    }
    Ok(builder.build())
}

/// Filtered scan through a table model.
pub async fn scan(model: &TableModel, conditions: &[Condition]) -> Result<ScanResult, EngineError> {
    let filter = translate_conditions(conditions)?;
    debug!(
        table = %model.table_name(),
        filter = filter.as_ref().map_or("", |f| f.expression.as_str()),
        "scanning table"
    );
    Ok(model.scan(filter, SCAN_PAGE_SIZE).await?)
}

/// Unfiltered first page of a table.
pub async fn list_records(
    documents: &DocumentClient,
    table_name: &str,
) -> Result<ScanResult, EngineError> {
    Ok(documents
        .scan(ScanInput {
            table_name: table_name.to_owned(),
            limit: Some(SCAN_PAGE_SIZE),
            ..Default::default()
        })
        .await?)
}
