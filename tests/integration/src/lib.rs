//! Integration tests for the Dynamon engine.
//!
//! These tests require a running DynamoDB (DynamoDB Local or a compatible
//! emulator) at `localhost:8000`. They are marked `#[ignore]` so they don't
//! run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p dynamon-integration -- --ignored
//! ```

use std::sync::Once;

use aws_credential_types::Credentials;
use aws_sdk_dynamodb::config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};

use dynamon_core::{DynamonConfig, Engine};
use dynamon_model::endpoint::Endpoint;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the DynamoDB under test.
fn endpoint_url() -> String {
    std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}

/// The endpoint descriptor the engine is driven with.
#[must_use]
pub fn endpoint() -> Endpoint {
    Endpoint::new("Local", "us-east-1", endpoint_url())
}

/// An engine whose only endpoint is [`endpoint`].
#[must_use]
pub fn engine() -> Engine {
    init_tracing();
    let config = DynamonConfig {
        local_endpoint: endpoint_url(),
        ..Default::default()
    };
    Engine::from_config(&config).unwrap_or_else(|e| panic!("failed to build engine: {e}"))
}

/// An SDK client used to seed and clean up fixtures independently of the
/// engine.
#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("local", "local", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a string-keyed table, with a sort key when `range` is given.
pub async fn create_table(
    client: &aws_sdk_dynamodb::Client,
    name: &str,
    hash: &str,
    range: Option<&str>,
) {
    let mut request = client
        .create_table()
        .table_name(name)
        .billing_mode(BillingMode::PayPerRequest);
    let keys = std::iter::once((hash, KeyType::Hash)).chain(range.map(|r| (r, KeyType::Range)));
    for (attribute, key_type) in keys {
        request = request
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(attribute)
                    .key_type(key_type)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(attribute)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            );
    }
    request
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create table {name}: {e}"));
}

/// Drop a fixture table, ignoring failures.
pub async fn drop_table(client: &aws_sdk_dynamodb::Client, name: &str) {
    let _ = client.delete_table().table_name(name).send().await;
}

mod test_engine;
