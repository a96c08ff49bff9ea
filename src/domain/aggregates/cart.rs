//! Cart Aggregate
//!
//! A session's shopping cart. Lines are identified by the product plus the
//! exact specification combination chosen at add time, so the same product
//! in two different configurations occupies two lines. Totals are derived
//! from the lines on every read rather than cached alongside them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
    currency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    /// Specification combination chosen at add time. `Some` even when the
    /// map is empty; `None` only for lines added without a selection step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl LineItem {
    /// Merge identity: product id joined with the canonical JSON of the
    /// specification combination, falling back to the variant id when no
    /// combination was recorded. An empty map (`{}`) is distinct from an
    /// absent one.
    pub fn identity_key(&self) -> String {
        let suffix = match &self.specifications {
            Some(specs) => serde_json::to_string(specs).unwrap_or_default(),
            None => self.variant_id.clone().unwrap_or_default(),
        };
        format!("{}:{}", self.product_id, suffix)
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], currency: currency.to_string() }
    }

    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Adds a line, merging quantities into an existing line with the same
    /// identity. A zero quantity counts as one.
    pub fn add(&mut self, mut item: LineItem) {
        item.quantity = item.quantity.max(1);
        let key = item.identity_key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.identity_key() == key) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
    }

    /// Sets a line's quantity. Zero removes the line; an unknown key is a no-op.
    pub fn update_quantity(&mut self, key: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.identity_key() == key) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.items.retain(|i| i.identity_key() != key);
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn total_items(&self) -> u32 {
        self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Sum of line totals. A line priced in a foreign currency cannot arise
    /// within one storefront and is skipped rather than poisoning the total.
    pub fn total_price(&self) -> Money {
        self.items.iter().fold(Money::zero(&self.currency), |acc, item| {
            acc.add(&item.line_total()).unwrap_or(acc)
        })
    }
}
