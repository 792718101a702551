//! # haveli-core: Pure Business Logic for Haveli POS
//!
//! This crate is the heart of Haveli POS. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! apps/terminal  (session, command handlers, CLI)
//!       │
//!       ▼
//! haveli-core (THIS CRATE)
//!   types • money • cart • validation • receipt
//!   NO I/O • NO DATABASE • NO NETWORK
//!       │
//!       ▼
//! haveli-db  (SQLite repositories, commit/void protocols)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, ShopSettings)
//! - [`money`] - Money type with integer paise arithmetic (no floating point)
//! - [`cart`] - The pending bill and its stock-guard rules
//! - [`receipt`] - Invoice document and WhatsApp deep-link rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, timestamps are inputs where output
//!    depends on them
//! 2. **No I/O**: database and network access are forbidden here
//! 3. **Integer money**: all monetary values are paise (i64)
//! 4. **Explicit errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed on a single bill.
///
/// Prevents runaway carts; a retail counter bill never legitimately reaches
/// this.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
