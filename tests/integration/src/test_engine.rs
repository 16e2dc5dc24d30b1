//! Engine integration tests against a running DynamoDB.

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde_json::json;

    use dynamon_core::{EngineError, EngineRequest, TableRequest};
    use dynamon_model::condition::{Condition, ConditionOperator};
    use dynamon_model::error::DynamoDBErrorCode;
    use dynamon_model::input::{CreateTableInput, DeleteTableInput};
    use dynamon_state::{Store, actions};

    use crate::{
        create_table, drop_table, dynamodb_client, endpoint, engine, test_table_name,
    };

    async fn seed_users(client: &aws_sdk_dynamodb::Client, table: &str) {
        for (id, name, age) in [("u1", "Alice", "25"), ("u2", "Andrew", "35"), ("u3", "Bob", "41")] {
            client
                .put_item()
                .table_name(table)
                .item("id", AttributeValue::S(id.to_owned()))
                .item("name", AttributeValue::S(name.to_owned()))
                .item("age", AttributeValue::N(age.to_owned()))
                .send()
                .await
                .unwrap_or_else(|e| panic!("failed to seed {table}: {e}"));
        }
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_list_and_describe_tables() {
        let client = dynamodb_client();
        let simple = test_table_name("list");
        let composite = test_table_name("list-range");
        create_table(&client, &simple, "id", None).await;
        create_table(&client, &composite, "pk", Some("sk")).await;

        let engine = engine();
        let tables = engine.list_tables(&endpoint()).await.unwrap();
        let found = tables.iter().find(|t| t.name() == composite).unwrap();
        assert_eq!(found.hash_key(), Some("pk"));
        assert_eq!(found.range_key(), Some("sk"));
        assert!(tables.iter().any(|t| t.name() == simple));

        let described = engine.describe_table(&endpoint(), &simple).await.unwrap();
        assert_eq!(described.range_key(), None);

        drop_table(&client, &simple).await;
        drop_table(&client, &composite).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_carry_provider_error_for_missing_table() {
        let result = engine()
            .describe_table(&endpoint(), "dynamon-does-not-exist")
            .await;
        assert!(matches!(
            result,
            Err(EngineError::Provider(e)) if e.code == DynamoDBErrorCode::ResourceNotFoundException
        ));
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_filter_scan_by_conditions() {
        let client = dynamodb_client();
        let table = test_table_name("scan");
        create_table(&client, &table, "id", None).await;
        seed_users(&client, &table).await;

        let mut request = EngineRequest::new(endpoint());
        request.table_name = Some(table.clone());
        request.conditions = Some(vec![
            Condition::new("age", ConditionOperator::Gt, "30", Some("N")),
            Condition::new("name", ConditionOperator::BeginsWith, "A", None),
        ]);
        let result = engine().scan(&request).await.unwrap();

        assert_eq!(result.count, 1);
        assert_eq!(result.items[0]["id"], json!("u2"));
        assert_eq!(result.items[0]["age"], json!(35));

        drop_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_list_records_unfiltered() {
        let client = dynamodb_client();
        let table = test_table_name("records");
        create_table(&client, &table, "id", None).await;
        seed_users(&client, &table).await;

        let mut request = EngineRequest::new(endpoint());
        request.table_name = Some(table.clone());
        let result = engine().list_records(&request).await.unwrap();

        assert_eq!(result.items.len(), 3);
        assert!(result.last_evaluated_key.is_none());

        drop_table(&client, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_create_and_delete_table() {
        let engine = engine();
        let table = test_table_name("lifecycle");
        let input: CreateTableInput = serde_json::from_value(json!({
            "TableName": table,
            "KeySchema": [{"AttributeName": "id", "KeyType": "HASH"}],
            "AttributeDefinitions": [{"AttributeName": "id", "AttributeType": "S"}],
            "BillingMode": "PAY_PER_REQUEST"
        }))
        .unwrap();

        let created = engine
            .create_table(TableRequest {
                endpoint: endpoint(),
                table: input,
            })
            .await
            .unwrap();
        assert_eq!(
            created.table_description.as_ref().map(|t| t.name()),
            Some(table.as_str())
        );

        engine
            .delete_table(TableRequest {
                endpoint: endpoint(),
                table: DeleteTableInput {
                    table_name: table.clone(),
                },
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB"]
    async fn test_should_drive_store_from_live_responses() {
        let client = dynamodb_client();
        let table = test_table_name("store");
        create_table(&client, &table, "id", None).await;
        seed_users(&client, &table).await;

        let engine = engine();
        let store = Store::default();
        for intent in [
            actions::read_tables(&endpoint()),
            actions::set_table(&table),
            actions::read_records(&endpoint(), &table, &[]),
        ] {
            store.dispatch(&intent.clone().into());
            if let Some(response) = engine.handle(&intent).await.unwrap() {
                store.dispatch(&response.into());
            }
        }

        let state = store.state();
        assert_eq!(state.table.as_ref().map(|t| t.name()), Some(table.as_str()));
        assert_eq!(state.records.as_ref().map(Vec::len), Some(3));

        drop_table(&client, &table).await;
    }
}
