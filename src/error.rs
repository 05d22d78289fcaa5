use crate::persistence::PersistenceError;
use thiserror::Error;

/// Errors surfaced by the planner and its calculators.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(#[source] PersistenceError),
}

impl PlannerError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        PlannerError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PlannerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Name of the offending field for input errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PlannerError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<PersistenceError> for PlannerError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Constraint(message) => PlannerError::Constraint(message),
            other => PlannerError::Storage(other),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
