//! Error kinds raised while composing or rendering queries.

use thiserror::Error;

/// Every failure mode of tree composition and rendering.
///
/// Rendering is deterministic and side-effect free, so none of these are
/// retried or recovered internally; they always propagate to the caller.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A node reached the renderer in a shape its kind does not allow
    /// (e.g. an ALTER with no operations).
    #[error("invalid child node: {0}")]
    InvalidChild(String),

    /// An operand list was supplied where a single value is required.
    #[error("expected a single value, got an array")]
    ExpectedSingleValue,

    /// A single operand was supplied where an array is required.
    #[error("expected an array value")]
    ExpectedArray,

    /// The generic operator helper was called with an argument count it
    /// cannot map to a node shape.
    #[error("cannot infer operator shape from {0} operand(s)")]
    InvalidArity(usize),

    /// The selected dialect cannot express the requested construct.
    #[error("{dialect} does not support {construct}")]
    UnsupportedConstruct {
        dialect: &'static str,
        construct: String,
    },

    /// MySQL `CHANGE COLUMN` requires an explicit data type.
    #[error("data type missing for column {0} (CHANGE COLUMN statements require a data type)")]
    MissingDataType(String),

    /// MSSQL cannot emit OFFSET without an ORDER BY clause.
    #[error("OFFSET requires an ORDER BY clause on this dialect")]
    MissingOrderBy,

    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// `to_named_query` was given an empty name.
    #[error("a query name has to be a non-empty string")]
    EmptyName,
}

impl QueryError {
    pub(crate) fn unsupported(dialect: &'static str, construct: impl Into<String>) -> Self {
        QueryError::UnsupportedConstruct {
            dialect,
            construct: construct.into(),
        }
    }
}
