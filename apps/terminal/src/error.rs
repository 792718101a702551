//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Haveli POS                             │
//! │                                                                         │
//! │  Operator action               Command handler                          │
//! │  ───────────────               ───────────────                         │
//! │                                                                         │
//! │  "finalize cash"                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Cart rule broken? ── CoreError::InsufficientStock ──┐          │  │
//! │  │         │                                            ▼          │  │
//! │  │  Commit failed?    ── DbError::StockConflict ──── ApiError ───► │  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The terminal prints `[CODE] message` and keeps the session alive.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use haveli_core::CoreError;
use haveli_db::DbError;

/// API error returned from terminal commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule violated
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Add-time stock check failed (cart snapshot)
    InsufficientStock,

    /// Commit-time stock check failed (live rows); bill kept for retry
    StockConflict,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::StockConflict {
                name,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::StockConflict,
                format!(
                    "Stock changed for {}: {} available, {} on the bill. Bill kept; adjust and retry.",
                    name, available, requested
                ),
            ),
            DbError::InvalidDraft(reason) => ApiError::validation(reason),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    name, available, requested
                ),
            ),
            CoreError::BillFinalized => ApiError::new(
                ErrorCode::BusinessLogic,
                "Bill already finalized; start a new bill",
            ),
            CoreError::CartEmpty => ApiError::cart("Cart is empty"),
            CoreError::LineNotFound { name } => {
                ApiError::cart(format!("No bill line for '{}'", name))
            }
            CoreError::CartTooLarge { max } => ApiError::cart(format!(
                "Cart cannot have more than {} items",
                max
            )),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
