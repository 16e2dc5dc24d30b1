//! The action vocabulary shared by the UI and the engine.
//!
//! Intents look like `{"type": "read tables", "payload": ..., "universal": false}`;
//! responses carry the same tag plus `"response": true`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Every type tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Select a table from the loaded list.
    #[serde(rename = "set table")]
    SetTable,
    /// Load the configured endpoints.
    #[serde(rename = "read endpoints")]
    ReadEndpoints,
    /// Load the tables of an endpoint.
    #[serde(rename = "read tables")]
    ReadTables,
    /// Create a table.
    #[serde(rename = "create table")]
    CreateTable,
    /// Describe one table.
    #[serde(rename = "read table")]
    ReadTable,
    /// Update a table.
    #[serde(rename = "update table")]
    UpdateTable,
    /// Delete a table.
    #[serde(rename = "delete table")]
    DeleteTable,
    /// Insert several records.
    #[serde(rename = "create records")]
    CreateRecords,
    /// Load records of a table.
    #[serde(rename = "read records")]
    ReadRecords,
    /// Update several records.
    #[serde(rename = "update records")]
    UpdateRecords,
    /// Delete several records.
    #[serde(rename = "delete records")]
    DeleteRecords,
    /// Insert one record.
    #[serde(rename = "create record")]
    CreateRecord,
    /// Update one record.
    #[serde(rename = "update record")]
    UpdateRecord,
    /// Delete one record.
    #[serde(rename = "delete record")]
    DeleteRecord,
}

impl ActionType {
    /// All tags, in vocabulary order.
    pub const ALL: [Self; 14] = [
        Self::SetTable,
        Self::ReadEndpoints,
        Self::ReadTables,
        Self::CreateTable,
        Self::ReadTable,
        Self::UpdateTable,
        Self::DeleteTable,
        Self::CreateRecords,
        Self::ReadRecords,
        Self::UpdateRecords,
        Self::DeleteRecords,
        Self::CreateRecord,
        Self::UpdateRecord,
        Self::DeleteRecord,
    ];

    /// The wire tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetTable => "set table",
            Self::ReadEndpoints => "read endpoints",
            Self::ReadTables => "read tables",
            Self::CreateTable => "create table",
            Self::ReadTable => "read table",
            Self::UpdateTable => "update table",
            Self::DeleteTable => "delete table",
            Self::CreateRecords => "create records",
            Self::ReadRecords => "read records",
            Self::UpdateRecords => "update records",
            Self::DeleteRecords => "delete records",
            Self::CreateRecord => "create record",
            Self::UpdateRecord => "update record",
            Self::DeleteRecord => "delete record",
        }
    }

    /// Look up a tag. Foreign tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode an optional payload, treating a missing one as `null`.
fn decode_payload<T: DeserializeOwned>(payload: Option<&Value>) -> Result<T, serde_json::Error> {
    match payload {
        Some(value) => T::deserialize(value),
        None => T::deserialize(Value::Null),
    }
}

/// An intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Type tag. Kept as a string so foreign tags survive a round trip.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Free-form payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// `true` when the effect is purely local and needs no round trip.
    #[serde(default)]
    pub universal: bool,
}

impl Action {
    /// Build an intent.
    #[must_use]
    pub fn new(universal: bool, action_type: ActionType, payload: Option<Value>) -> Self {
        Self {
            action_type: action_type.as_str().to_owned(),
            payload,
            universal,
        }
    }

    /// The tag, if it belongs to the vocabulary.
    #[must_use]
    pub fn kind(&self) -> Option<ActionType> {
        ActionType::from_tag(&self.action_type)
    }

    /// Decode the payload.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        decode_payload(self.payload.as_ref())
    }
}

/// An authoritative result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAction {
    /// Type tag of the intent this answers.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Result payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Always `true`; marks the message as a response.
    pub response: bool,
}

impl ResponseAction {
    /// Build a response.
    #[must_use]
    pub fn new(action_type: ActionType, payload: Option<Value>) -> Self {
        Self {
            action_type: action_type.as_str().to_owned(),
            payload,
            response: true,
        }
    }

    /// The tag, if it belongs to the vocabulary.
    #[must_use]
    pub fn kind(&self) -> Option<ActionType> {
        ActionType::from_tag(&self.action_type)
    }

    /// Decode the payload.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        decode_payload(self.payload.as_ref())
    }
}

/// Anything that travels over the UI/engine channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    /// An intent.
    Intent(Action),
    /// A response.
    Response(ResponseAction),
}

impl Message {
    /// The raw type tag.
    #[must_use]
    pub fn action_type(&self) -> &str {
        match self {
            Self::Intent(a) => &a.action_type,
            Self::Response(r) => &r.action_type,
        }
    }

    /// The raw payload.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Intent(a) => a.payload.as_ref(),
            Self::Response(r) => r.payload.as_ref(),
        }
    }

    /// Whether this is a response.
    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

impl From<Action> for Message {
    fn from(action: Action) -> Self {
        Self::Intent(action)
    }
}

impl From<ResponseAction> for Message {
    fn from(response: ResponseAction) -> Self {
        Self::Response(response)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_response = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("response"));

        if is_response {
            ResponseAction::deserialize(value)
                .map(Self::Response)
                .map_err(serde::de::Error::custom)
        } else {
            Action::deserialize(value)
                .map(Self::Intent)
                .map_err(serde::de::Error::custom)
        }
    }
}

fn to_payload<T: Serialize>(value: T) -> Option<Value> {
    // Model types serialize infallibly; a failure degrades to a null payload.
    Some(serde_json::to_value(value).unwrap_or(Value::Null))
}

/// Intent constructors.
pub mod actions {
    use dynamon_model::condition::Condition;
    use dynamon_model::endpoint::Endpoint;
    use serde_json::{Map, Value};

    use super::{Action, ActionType, to_payload};

    fn table_request(endpoint: &Endpoint, table_name: &str) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("endpoint".to_owned(), to_payload(endpoint).unwrap_or_default());
        payload.insert("tableName".to_owned(), Value::from(table_name));
        payload
    }

    /// Select a loaded table by name. Purely local.
    #[must_use]
    pub fn set_table(table_name: &str) -> Action {
        Action::new(true, ActionType::SetTable, Some(Value::from(table_name)))
    }

    /// Load the configured endpoints.
    #[must_use]
    pub fn read_endpoints() -> Action {
        Action::new(false, ActionType::ReadEndpoints, None)
    }

    /// Load the tables of `endpoint`.
    #[must_use]
    pub fn read_tables(endpoint: &Endpoint) -> Action {
        Action::new(false, ActionType::ReadTables, to_payload(endpoint))
    }

    /// Describe one table.
    #[must_use]
    pub fn read_table(endpoint: &Endpoint, table_name: &str) -> Action {
        Action::new(
            false,
            ActionType::ReadTable,
            Some(Value::Object(table_request(endpoint, table_name))),
        )
    }

    /// Load records, filtered by `conditions` when any are given.
    #[must_use]
    pub fn read_records(endpoint: &Endpoint, table_name: &str, conditions: &[Condition]) -> Action {
        let mut payload = table_request(endpoint, table_name);
        if !conditions.is_empty() {
            payload.insert("conditions".to_owned(), to_payload(conditions).unwrap_or_default());
        }
        Action::new(false, ActionType::ReadRecords, Some(Value::Object(payload)))
    }

    /// Insert several records.
    #[must_use]
    pub fn create_records(table_name: &str, records: Vec<Value>) -> Action {
        Action::new(
            false,
            ActionType::CreateRecords,
            Some(serde_json::json!({ "tableName": table_name, "records": records })),
        )
    }

    /// Insert one record.
    #[must_use]
    pub fn create_record(table_name: &str, record: Value) -> Action {
        Action::new(
            false,
            ActionType::CreateRecord,
            Some(serde_json::json!({ "tableName": table_name, "record": record })),
        )
    }

    /// Update one record.
    #[must_use]
    pub fn update_record(table_name: &str, record: Value) -> Action {
        Action::new(
            false,
            ActionType::UpdateRecord,
            Some(serde_json::json!({ "tableName": table_name, "record": record })),
        )
    }

    /// Delete one record.
    #[must_use]
    pub fn delete_record(record: Value) -> Action {
        Action::new(false, ActionType::DeleteRecord, Some(record))
    }
}

/// Response constructors.
pub mod responses {
    use dynamon_model::document::Record;
    use dynamon_model::endpoint::Endpoint;
    use dynamon_model::types::TableDescription;
    use serde_json::Value;

    use super::{ActionType, ResponseAction, to_payload};

    /// The configured endpoints.
    #[must_use]
    pub fn read_endpoints(endpoints: &[Endpoint]) -> ResponseAction {
        ResponseAction::new(ActionType::ReadEndpoints, to_payload(endpoints))
    }

    /// The tables of an endpoint, in listing order.
    #[must_use]
    pub fn read_tables(tables: &[TableDescription]) -> ResponseAction {
        ResponseAction::new(ActionType::ReadTables, to_payload(tables))
    }

    /// One table description.
    #[must_use]
    pub fn read_table(table: &TableDescription) -> ResponseAction {
        ResponseAction::new(ActionType::ReadTable, to_payload(table))
    }

    /// Result of a bulk insert.
    #[must_use]
    pub fn create_records(result: Value) -> ResponseAction {
        ResponseAction::new(ActionType::CreateRecords, Some(result))
    }

    /// A page of records.
    #[must_use]
    pub fn read_records(records: &[Record]) -> ResponseAction {
        ResponseAction::new(ActionType::ReadRecords, to_payload(records))
    }

    /// The updated record.
    #[must_use]
    pub fn update_record(record: Value) -> ResponseAction {
        ResponseAction::new(ActionType::UpdateRecord, Some(record))
    }

    /// Acknowledge a deletion.
    #[must_use]
    pub fn delete_record() -> ResponseAction {
        ResponseAction::new(ActionType::DeleteRecord, None)
    }
}
