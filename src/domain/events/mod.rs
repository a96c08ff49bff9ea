//! Domain events
//!
//! Raised by aggregates and drained by whoever commits them; the HTTP layer
//! forwards them to NATS when a broker is connected.
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Imported { product_id: String, external_id: String, variant_count: usize },
    Updated { product_id: String },
    Published { product_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CheckoutEvent {
    Submitted { checkout_id: String, session_id: String, total_items: u32 },
}
