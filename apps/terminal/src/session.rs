//! # Session State
//!
//! The billing session: the cart being assembled plus the last finalized
//! sale (kept for reprint and the immediate-void shortcut).
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because command handlers run
//! on the async runtime and may be invoked concurrently; only one handler
//! may mutate the session at a time. The lock is held only across the
//! in-memory mutation, never across a database await.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session State Transitions                            │
//! │                                                                         │
//! │  add / edit / remove ────► cart mutates, last_sale untouched           │
//! │                                                                         │
//! │  finalize ───────────────► commit_sale() succeeds                      │
//! │                            cart cleared, last_sale = Some(receipt)     │
//! │                                                                         │
//! │  finalize (conflict) ────► commit_sale() rolled back                   │
//! │                            cart KEPT so the operator can adjust        │
//! │                                                                         │
//! │  void last ──────────────► void_sale() succeeds, last_sale = None      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use serde::Serialize;

use haveli_core::{Cart, Sale, SaleItem};

/// A finalized sale held in the session for reprint and void.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedSale {
    /// The committed sale header.
    pub sale: Sale,

    /// The frozen item rows, in bill order.
    pub items: Vec<SaleItem>,

    /// Rendered invoice document bytes.
    pub document: Vec<u8>,

    /// WhatsApp deep link, when the customer left a phone number.
    pub whatsapp_link: Option<String>,
}

/// Mutable session data.
#[derive(Debug, Default)]
pub struct Session {
    /// The bill being assembled.
    pub cart: Cart,

    /// The most recently finalized sale, if any.
    pub last_sale: Option<FinalizedSale>,
}

impl Session {
    /// Creates a fresh session with an empty cart.
    pub fn new() -> Self {
        Session {
            cart: Cart::new(),
            last_sale: None,
        }
    }
}

/// Shared session state.
///
/// Cloning shares the underlying session (the `Arc` is cloned, not the
/// data), so handlers and the command loop see the same bill.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    /// Creates a new empty session state.
    pub fn new() -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(Session::new())),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = session.with_session(|s| s.cart.total());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let session = self.inner.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_session_mut(|s| s.cart.add_item(&product, 1))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut session = self.inner.lock().expect("Session mutex poisoned");
        f(&mut session)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_same_session() {
        let state = SessionState::new();
        let other = state.clone();

        state.with_session_mut(|s| {
            s.cart.lines.push(haveli_core::CartLine {
                product_id: "p1".to_string(),
                name: "Switch".to_string(),
                quantity: 1,
                unit_price_paise: 5000,
                unit_cost_paise: 3000,
                added_at: chrono::Utc::now(),
            });
        });

        assert_eq!(other.with_session(|s| s.cart.line_count()), 1);
    }

    #[test]
    fn test_new_session_is_empty() {
        let state = SessionState::new();
        assert!(state.with_session(|s| s.cart.is_empty()));
        assert!(state.with_session(|s| s.last_sale.is_none()));
    }
}
