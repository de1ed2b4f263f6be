use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Store,
    RouteConfiguration,
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("entry not found: {slug}")]
    NotFound { slug: String },
    #[error("submitted entry is invalid")]
    Validation,
    #[error("store failure: {0}")]
    Store(String),
}

impl JournalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation => ErrorCode::Validation,
            Self::Store(_) => ErrorCode::Store,
        }
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

/// Raised while the route table is being built. Never produced per request.
#[derive(Debug, Error)]
#[error("invalid route pattern `{pattern}`: {message}")]
pub struct RouteError {
    pub pattern: String,
    pub message: String,
}

impl RouteError {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::RouteConfiguration
    }
}
