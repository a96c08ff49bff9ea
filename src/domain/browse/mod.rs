//! Browse pipeline
//!
//! What a shopper works with while configuring a listing: the
//! [`SpecificationIndex`] derives the selectable axes from the variant
//! list, a [`Selection`] tracks the shopper's choices, [`resolve`] finds
//! the variant an exact combination denotes, and [`project`] turns the
//! outcome into the price and images to display.

pub mod display;
pub mod index;
pub mod resolve;

pub use display::{cheapest_price, project, DisplayProjection};
pub use index::{SpecAxis, SpecificationIndex};
pub use resolve::{resolve, Resolution};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The shopper's current choices, one value per specification key. A key
/// that was never chosen is simply absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    /// Choosing the already-chosen value clears the key; any other value
    /// replaces it.
    pub fn toggle(&mut self, key: &str, value: &str) {
        if self.0.get(key).map(String::as_str) == Some(value) {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    pub fn clear(&mut self) { self.0.clear(); }

    /// Drops keys the index does not know, applied where raw selections
    /// cross the API boundary.
    pub fn retain_known(&mut self, index: &SpecificationIndex) {
        self.0.retain(|key, _| index.contains_key(key));
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> { self.0.clone() }
}

impl From<BTreeMap<String, String>> for Selection {
    fn from(map: BTreeMap<String, String>) -> Self { Self(map) }
}
