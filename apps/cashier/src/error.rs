//! # API Error Type
//!
//! Unified error type for cashier commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kedai POS                              │
//! │                                                                         │
//! │  {"command":"pay","args":{...}}                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  → Result<T, ApiError>                         │  │
//! │  │         │                                                        │  │
//! │  │  Rule violation? ─── CoreError / DbError::Core ── kind() ──┐     │  │
//! │  │         │                                                  │     │  │
//! │  │  Constraint race? ── DbError::UniqueViolation ─ CONFLICT ──┤     │  │
//! │  │         │                                                  ▼     │  │
//! │  │  Infrastructure? ─── logged, generic message ─────────► ApiError │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"ok":false,"error":{"code":"CONFLICT","message":"Order ... paid"}}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kedai_core::{CoreError, ErrorKind};
use kedai_db::DbError;
use serde::Serialize;
use tracing::error;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 4b1f..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Table, order, line item or menu item not found
    NotFound,

    /// Malformed input (quantity, tender, names)
    InvalidArgument,

    /// Operation illegal for the order's status
    InvalidState,

    /// Occupied table, already paid, or a lost race
    Conflict,

    /// Database operation failed
    DatabaseError,

    /// Internal error (configuration, serialization)
    Internal,

    /// The request line could not be understood
    BadRequest,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::InvalidArgument => ErrorCode::InvalidArgument,
            ErrorKind::InvalidState => ErrorCode::InvalidState,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::Internal => ErrorCode::Internal,
        }
    }
}

/// Converts core errors to API errors. Rule messages are safe to show.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.kind().into(), err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(e) => e.into(),
            DbError::UniqueViolation { field } => ApiError::new(
                ErrorCode::Conflict,
                format!("Duplicate {field}; the data changed, reload and retry"),
            ),
            DbError::Busy(e) => {
                error!("Database busy: {}", e);
                ApiError::new(ErrorCode::Conflict, "Another cashier is saving, please retry")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::InvalidArgument, "Invalid reference")
            }
            DbError::InvalidSetting { key, reason } => {
                error!(%key, %reason, "Invalid setting");
                ApiError::new(ErrorCode::Internal, format!("Setting {key} is misconfigured"))
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use kedai_core::{OrderStatus, ValidationError};

    #[test]
    fn test_core_errors_keep_their_message() {
        let err: ApiError = CoreError::OrderClosed {
            order_id: "o-1".into(),
            status: OrderStatus::Paid,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(err.message, "Order o-1 is paid and can no longer be changed");

        let err: ApiError = CoreError::from(ValidationError::MustBePositive {
            field: "quantity".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_db_errors_hide_internals() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let err: ApiError = DbError::UniqueViolation {
            field: "transactions.order_id".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = DbError::not_found("Order", "o-9").into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::bad_request("expected JSON")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "BAD_REQUEST", "message": "expected JSON"})
        );
    }
}
