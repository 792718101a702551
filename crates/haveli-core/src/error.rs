//! # Error Types
//!
//! Domain-specific error types for haveli-core.
//!
//! ## Error Hierarchy
//! ```text
//! haveli-core errors (this file)
//! ├── CoreError        - Business rule violations (stock guards, cart rules)
//! └── ValidationError  - Input validation failures
//!
//! haveli-db errors (separate crate)
//! └── DbError          - Persistence failures, commit-time stock conflicts
//!
//! Terminal API errors (in app)
//! └── ApiError         - What the operator sees (code + message)
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. They are caught at the boundary
/// nearest the user action and surfaced as a rejected operation; the cart and
/// stock state are left unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity exceeds the available stock snapshot.
    ///
    /// Raised at add-to-cart time. When the product is already in the cart,
    /// `requested` is the combined quantity (existing line + new request).
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The bill has been finalized; the cart can no longer be mutated.
    ///
    /// A finalized bill is either voided (which resets the session) or left
    /// as-is; starting a new bill clears this state.
    #[error("Bill is finalized; start a new bill to make changes")]
    BillFinalized,

    /// Operation requires a non-empty cart.
    #[error("Cart is empty")]
    CartEmpty,

    /// Referenced cart line does not exist.
    #[error("No line for '{name}' in the current bill")]
    LineNotFound { name: String },

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Anchor Switch".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Anchor Switch: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
