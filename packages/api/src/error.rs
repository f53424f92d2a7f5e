//! Server-side error type and its conversion at the server-function boundary.

use dioxus::prelude::ServerFnError;
use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Push delivery failed: {0}")]
    Push(String),
}

impl ApiError {
    /// Message safe to show to the client. Database details stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// A unique-constraint violation becomes [`ApiError::Conflict`] with `message`;
    /// anything else is returned unchanged.
    pub fn unique_as_conflict(self, message: &str) -> ApiError {
        match &self {
            ApiError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                ApiError::Conflict(message.to_string())
            }
            _ => self,
        }
    }
}

/// Convert any server-side error into a [`ServerFnError`].
pub fn server_error(e: ApiError) -> ServerFnError {
    ServerFnError::new(e.client_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug, Error)]
    #[error("constraint failed")]
    struct FakeDbError {
        unique: bool,
    }

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint failed"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn db_error(unique: bool) -> ApiError {
        ApiError::Database(sqlx::Error::Database(Box::new(FakeDbError { unique })))
    }

    #[test]
    fn test_duplicate_email_insert_is_a_conflict() {
        let err = db_error(true).unique_as_conflict("taken");
        assert!(matches!(&err, ApiError::Conflict(m) if m == "taken"));
        assert_eq!(err.client_message(), "taken");
    }

    #[test]
    fn test_other_database_errors_stay_internal() {
        let err = db_error(false).unique_as_conflict("taken");
        assert!(matches!(err, ApiError::Database(_)));

        let err = ApiError::Database(sqlx::Error::RowNotFound).unique_as_conflict("taken");
        assert!(matches!(err, ApiError::Database(_)));
    }
}
