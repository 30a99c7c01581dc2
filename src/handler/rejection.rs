use crate::types::{BoxError, StaticString};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Rejecting with this exact string stops resolution without failing it.
pub const HALT_SENTINEL: StaticString = "route";

/// An application failure raised by a handler.
///
/// Rejections reach the caller of resolve unchanged, except that several
/// failures from one parallel group are gathered into [`Rejection::Aggregate`].
#[derive(Debug, Clone, Error)]
pub enum Rejection {
    #[error("handler rejected with {0}")]
    Value(Value),
    #[error(transparent)]
    Error(Arc<dyn std::error::Error + Send + Sync + 'static>),
    #[error("{} parallel handlers rejected", .0.len())]
    Aggregate(Vec<Rejection>),
}

impl Rejection {
    pub fn value(value: impl Into<Value>) -> Self {
        Rejection::Value(value.into())
    }

    pub fn error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Rejection::Error(Arc::new(error))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Rejection::Value(value) => Some(value),
            _ => None,
        }
    }

    /// True for a string value equal to [`HALT_SENTINEL`]. Application code
    /// that happens to reject with that string halts instead of failing.
    pub fn is_halt_sentinel(&self) -> bool {
        matches!(self, Rejection::Value(Value::String(s)) if s == HALT_SENTINEL)
    }
}

impl PartialEq for Rejection {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rejection::Value(a), Rejection::Value(b)) => a == b,
            (Rejection::Error(a), Rejection::Error(b)) => Arc::ptr_eq(a, b),
            (Rejection::Aggregate(a), Rejection::Aggregate(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for Rejection {
    fn from(value: Value) -> Self {
        Rejection::Value(value)
    }
}

impl From<&str> for Rejection {
    fn from(value: &str) -> Self {
        Rejection::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Rejection {
    fn from(value: String) -> Self {
        Rejection::Value(Value::String(value))
    }
}

impl From<BoxError> for Rejection {
    fn from(error: BoxError) -> Self {
        Rejection::Error(Arc::from(error))
    }
}
