//! Specification Index
//!
//! The selectable axes of a listing, derived from its variant list. Each
//! axis is one specification key with the distinct values seen for it, in
//! the order the variant list first mentions them. The index is recomputed
//! whenever a product is viewed and never persisted.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::Variant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecAxis {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationIndex {
    axes: Vec<SpecAxis>,
}

impl SpecificationIndex {
    /// Walks the variant list in order, collecting every specification key
    /// into an axis and every value under its axis, deduplicated, both in
    /// first-sighting order. Variants with no specifications contribute
    /// nothing; an empty variant list yields an empty index.
    pub fn from_variants(variants: &[Variant]) -> Self {
        let mut axes: Vec<SpecAxis> = Vec::new();
        for variant in variants {
            for (key, value) in &variant.specifications {
                match axes.iter_mut().find(|axis| axis.name == *key) {
                    Some(axis) => {
                        if !axis.values.iter().any(|v| v == value) {
                            axis.values.push(value.clone());
                        }
                    }
                    None => axes.push(SpecAxis { name: key.clone(), values: vec![value.clone()] }),
                }
            }
        }
        Self { axes }
    }

    pub fn axes(&self) -> &[SpecAxis] { &self.axes }
    pub fn len(&self) -> usize { self.axes.len() }
    pub fn is_empty(&self) -> bool { self.axes.is_empty() }
    pub fn contains_key(&self, name: &str) -> bool { self.axes.iter().any(|axis| axis.name == name) }
}
