/// Core error taxonomy
///
/// Every core operation returns `CoreResult<T>`. The variants map one-to-one
/// onto what the presentation layer reports to the acting user:
///
/// | Variant | Meaning |
/// |---|---|
/// | `Validation` | a required field is missing or malformed, nothing written |
/// | `Conflict` | a uniqueness rule would be broken, nothing written |
/// | `Permission` | the actor may not perform the action |
/// | `InvalidCredentials` | login failed; never says which factor was wrong |
/// | `NotFound` | a referenced entity does not exist |
/// | `Password` / `Database` | internal failures |

use serde::Serialize;
use uuid::Uuid;

use crate::auth::{authorization::AuthzError, password::PasswordError};

/// Result alias used by the services
pub type CoreResult<T> = Result<T, CoreError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Permission(#[from] AuthzError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Password operation failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CoreError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: &str, message: &str) -> Self {
        CoreError::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CoreError::NotFound { entity, id }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldViolation::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();

        // HashMap order is not stable
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        CoreError::Validation(violations)
    }
}

/// Whether a database error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
