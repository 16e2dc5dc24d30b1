//! Fold validated conditions into a filter expression.

use std::collections::HashMap;

use dynamon_model::attribute_value::AttributeValue;
use dynamon_model::condition::{ConditionOperator, FilterCondition};

use super::ast::{CompareOp, Expr, FunctionName, Operand};

/// A rendered filter with its placeholder maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    /// The `FilterExpression` string.
    pub expression: String,
    /// `#fN` -> attribute name.
    pub names: HashMap<String, String>,
    /// `:vN` -> value.
    pub values: HashMap<String, AttributeValue>,
}

/// ANDs conditions together in the order they are pushed.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    expr: Option<Expr>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
    counter: usize,
}

impl FilterBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one condition.
    pub fn push(&mut self, condition: &FilterCondition) -> &mut Self {
        let name_ph = format!("#f{}", self.counter);
        let val_ph = format!(":v{}", self.counter);
        self.counter += 1;

        self.names.insert(name_ph.clone(), condition.property.clone());
        if condition.operator.takes_value() {
            self.values.insert(val_ph.clone(), condition.value.clone());
        }

        let path = Operand::Path(name_ph);
        let value = Operand::Value(val_ph);
        let compare = |op| Expr::Compare {
            left: path.clone(),
            op,
            right: value.clone(),
        };
        let function = |name, args| Expr::Function { name, args };

        let expr = match condition.operator {
            ConditionOperator::Eq => compare(CompareOp::Eq),
            ConditionOperator::Ne => compare(CompareOp::Ne),
            ConditionOperator::Lt => compare(CompareOp::Lt),
            ConditionOperator::Lte => compare(CompareOp::Le),
            ConditionOperator::Gt => compare(CompareOp::Gt),
            ConditionOperator::Gte => compare(CompareOp::Ge),
            ConditionOperator::BeginsWith => {
                function(FunctionName::BeginsWith, vec![path.clone(), value.clone()])
            }
            ConditionOperator::Contains => {
                function(FunctionName::Contains, vec![path.clone(), value.clone()])
            }
            ConditionOperator::NotContains => Expr::Not(Box::new(function(
                FunctionName::Contains,
                vec![path.clone(), value.clone()],
            ))),
            ConditionOperator::Exists => function(FunctionName::AttributeExists, vec![path.clone()]),
            ConditionOperator::NotExists => {
                function(FunctionName::AttributeNotExists, vec![path.clone()])
            }
        };

        self.expr = Some(match self.expr.take() {
            Some(acc) => acc.and(expr),
            None => expr,
        });
        self
    }

    /// Render the filter, or `None` when nothing was pushed.
    #[must_use]
    pub fn build(self) -> Option<FilterExpression> {
        let expr = self.expr?;
        Some(FilterExpression {
            expression: expr.to_string(),
            names: self.names,
            values: self.values,
        })
    }
}
