//! Filter expressions.
//!
//! Validated conditions are mapped onto a small expression AST and rendered
//! into a DynamoDB `FilterExpression` with `#fN` name and `:vN` value
//! placeholders.

pub mod ast;
pub mod builder;

pub use ast::{CompareOp, Expr, FunctionName, Operand};
pub use builder::{FilterBuilder, FilterExpression};
