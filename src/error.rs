// src/error.rs

use thiserror::Error;

use crate::models::{Category, Status};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("no eligible field manager for category '{category}'")]
    RoutingFailure { category: Category },

    #[error("cannot move complaint from '{from}' to '{to}'")]
    InvalidTransition { from: Status, to: Status },

    #[error("store error: {0}")]
    Store(String),
}

impl IntakeError {
    pub fn complaint_not_found(id: impl Into<String>) -> Self {
        IntakeError::NotFound { kind: "complaint", id: id.into() }
    }

    pub fn manager_not_found(id: impl Into<String>) -> Self {
        IntakeError::NotFound { kind: "field manager", id: id.into() }
    }
}

impl From<sqlx::Error> for IntakeError {
    fn from(e: sqlx::Error) -> Self {
        IntakeError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(e: serde_json::Error) -> Self {
        IntakeError::Store(format!("malformed record: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
