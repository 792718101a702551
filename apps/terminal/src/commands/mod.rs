//! # Command Handlers
//!
//! One module per screen of the terminal:
//!
//! - [`cart`] - Building the pending bill
//! - [`sale`] - Finalizing, voiding, receipts
//! - [`product`] - Inventory management
//! - [`settings`] - Shop profile
//! - [`insights`] - Sales analytics
//!
//! Handlers are plain async functions over ([`Database`], [`SessionState`])
//! returning serializable views, so the interactive loop and the tests call
//! them the same way.
//!
//! [`Database`]: haveli_db::Database
//! [`SessionState`]: crate::session::SessionState

pub mod cart;
pub mod insights;
pub mod product;
pub mod sale;
pub mod settings;
