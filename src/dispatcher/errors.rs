use super::OptionsError;
use crate::handler::Rejection;
use crate::pattern::PatternError;
use thiserror::Error;

/// Raised while registering handlers, before any path is resolved.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Options(#[from] OptionsError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("path to be resolved must be a string (got {found})")]
    TypeContract { found: &'static str },
    /// A handler failed; the rejection is exactly what it returned.
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl DispatchError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DispatchError::Rejected(rejection) => Some(rejection),
            DispatchError::TypeContract { .. } => None,
        }
    }

    pub fn into_rejection(self) -> Option<Rejection> {
        match self {
            DispatchError::Rejected(rejection) => Some(rejection),
            DispatchError::TypeContract { .. } => None,
        }
    }
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
pub type DispatchResult<T> = Result<T, DispatchError>;
