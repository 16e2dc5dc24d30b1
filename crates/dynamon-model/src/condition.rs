//! Scan filter conditions.
//!
//! A [`Condition`] is what the UI sends: every field optional and the operator
//! a free-form name. [`Condition::resolve`] turns it into a [`FilterCondition`]
//! with a closed operator and a typed value, or reports that it is inert.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::attribute_value::AttributeValue;
use crate::document::json_to_attribute;

/// Errors raised while resolving a condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// The operator name is not one of the supported comparisons.
    #[error("unknown condition operator: {0:?}")]
    UnknownOperator(String),
    /// A `type: "N"` condition whose value is not a number.
    #[error("condition on {property} expects a number, got {value}")]
    InvalidNumber {
        /// The attribute the condition applies to.
        property: String,
        /// The offending value, as JSON.
        value: String,
    },
}

/// Comparison operators accepted in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    /// `attr = value`
    Eq,
    /// `attr <> value`
    Ne,
    /// `attr < value`
    Lt,
    /// `attr <= value`
    Lte,
    /// `attr > value`
    Gt,
    /// `attr >= value`
    Gte,
    /// `begins_with(attr, value)`
    BeginsWith,
    /// `contains(attr, value)`
    Contains,
    /// `NOT contains(attr, value)`
    NotContains,
    /// `attribute_exists(attr)`
    Exists,
    /// `attribute_not_exists(attr)`
    NotExists,
}

impl ConditionOperator {
    /// All supported operators.
    pub const ALL: [Self; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::BeginsWith,
        Self::Contains,
        Self::NotContains,
        Self::Exists,
        Self::NotExists,
    ];

    /// The operator name used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::BeginsWith => "beginsWith",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Exists => "exists",
            Self::NotExists => "notExists",
        }
    }

    /// Look up an operator by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Whether the operator compares against the condition value.
    #[must_use]
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Exists | Self::NotExists)
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition as received from the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Attribute name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Operator name, see [`ConditionOperator`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Comparison value. An explicit `null` is a value; a missing key is not.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Value type tag; `"N"` coerces the value to a number.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Condition {
    /// Build a fully specified condition.
    pub fn new(
        property: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<Value>,
        value_type: Option<&str>,
    ) -> Self {
        Self {
            property: Some(property.into()),
            operator: Some(operator.as_str().to_owned()),
            value: Some(value.into()),
            value_type: value_type.map(str::to_owned),
        }
    }

    /// A condition without a property or value contributes nothing.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.property.as_deref().is_none_or(str::is_empty) || self.value.is_none()
    }

    /// Validate and type the condition.
    ///
    /// Returns `Ok(None)` for inert conditions.
    pub fn resolve(&self) -> Result<Option<FilterCondition>, ConditionError> {
        let (Some(property), Some(value)) = (self.property.as_deref(), self.value.as_ref()) else {
            return Ok(None);
        };
        if property.is_empty() {
            return Ok(None);
        }

        let name = self.operator.as_deref().unwrap_or_default();
        let operator = ConditionOperator::from_name(name)
            .ok_or_else(|| ConditionError::UnknownOperator(name.to_owned()))?;

        let value = if self.value_type.as_deref() == Some("N") {
            coerce_number(property, value)?
        } else {
            json_to_attribute(value)
        };

        Ok(Some(FilterCondition {
            property: property.to_owned(),
            operator,
            value,
        }))
    }
}

/// Coerce a condition value to a DynamoDB number.
///
/// Accepts JSON numbers and strings holding a finite decimal number, with
/// surrounding whitespace and a leading `+` dropped. Blank strings, booleans
/// and other values are rejected rather than read as `0` or `1`.
fn coerce_number(property: &str, value: &Value) -> Result<AttributeValue, ConditionError> {
    let invalid = || ConditionError::InvalidNumber {
        property: property.to_owned(),
        value: value.to_string(),
    };
    match value {
        Value::Number(n) => Ok(AttributeValue::N(n.to_string())),
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = match trimmed.strip_prefix('+') {
                Some(rest) if !rest.starts_with(['+', '-']) => rest,
                _ => trimmed,
            };
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(AttributeValue::N(trimmed.to_owned())),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// A validated filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Attribute name.
    pub property: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Comparison value (ignored by `exists`/`notExists`).
    pub value: AttributeValue,
}
