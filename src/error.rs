use crate::value::ScalarKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: ScalarKind,
        found: ScalarKind,
    },

    #[error("Name '{name}' is already used by a {taken_by}")]
    NameConflict { name: String, taken_by: &'static str },

    #[error("Child group not found: {0}")]
    MissingChild(String),

    #[error("Non-finite float in leaf: {0}")]
    NonFiniteFloat(String),

    #[error("Nesting depth {depth} exceeds the limit of {limit} levels")]
    TooDeep { depth: usize, limit: usize },
}

impl StoreError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        StoreError::Syntax(msg.into())
    }

    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        StoreError::Decode(msg.into())
    }
}
