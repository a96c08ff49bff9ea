//! Checkout handoff
//!
//! The storefront does not take orders. At checkout it freezes the cart
//! into a snapshot and hands it to the external order collaborator; the
//! cart itself stays as it was, since the collaborator owns everything
//! from here on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::{Cart, LineItem};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::Money;

/// NATS subject checkout submissions are published on.
pub const CHECKOUT_SUBJECT: &str = "storefront.checkout.submitted";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSnapshot {
    pub checkout_id: String,
    pub session_id: String,
    pub items: Vec<LineItem>,
    pub total_price: Money,
    pub total_items: u32,
    pub submitted_at: DateTime<Utc>,
}

impl CheckoutSnapshot {
    /// Freezes the cart as submitted: lines verbatim, totals derived at
    /// this moment, a fresh checkout reference for the collaborator to
    /// hand back.
    pub fn from_cart(session_id: &str, cart: &Cart) -> Self {
        Self {
            checkout_id: Uuid::now_v7().to_string(),
            session_id: session_id.to_string(),
            items: cart.items().to_vec(),
            total_price: cart.total_price(),
            total_items: cart.total_items(),
            submitted_at: Utc::now(),
        }
    }

    pub fn submitted_event(&self) -> DomainEvent {
        DomainEvent::Checkout(CheckoutEvent::Submitted {
            checkout_id: self.checkout_id.clone(),
            session_id: self.session_id.clone(),
            total_items: self.total_items,
        })
    }
}
