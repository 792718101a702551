//! # Repository Modules
//!
//! Database access organized by domain area. Each repository owns the SQL
//! for one table family and borrows a clone of the shared pool.
//!
//! - [`product`] - Inventory CRUD, guarded stock mutation, bulk import
//! - [`sale`] - The commit and void protocols, sale lookups
//! - [`settings`] - The singleton shop profile row
//! - [`insights`] - Read-only analytics over finalized sales

pub mod insights;
pub mod product;
pub mod sale;
pub mod settings;
