//! Service-level error type.

use crate::db::RepositoryError;
use crate::models::InvalidRange;

use super::forms::FieldErrors;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or inverted date input (`start >= end`).
    #[error("invalid date range")]
    InvalidRange(#[from] InvalidRange),

    /// The requested room/date combination is taken.
    #[error("no availability for the requested dates")]
    NotAvailable,

    /// Guest-detail validation failed; all field problems are reported
    /// together, the caller redisplays the form.
    #[error("form validation failed")]
    Validation(FieldErrors),

    /// A draft was expected in the session but is not there (expired,
    /// already consumed, or the visitor skipped a step).
    #[error("no booking in progress: {0}")]
    SessionStateMissing(&'static str),

    /// The store call failed or timed out.
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl ServiceError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
