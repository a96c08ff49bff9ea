//! Product Aggregate
//!
//! Catalog listings as the storefront reads them: a base price and image set,
//! plus zero or more purchasable variants keyed by specification combinations
//! (e.g. Color/Size). Listings arrive through the import pipeline as drafts
//! and go live once reviewed and published.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Primary image; kept in sync with the head of `images`.
    pub image: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub stock: u32,
    pub price: Money,
    /// Source marketplace price, for reference during review.
    pub original_price: Option<Money>,
    pub source_url: Option<String>,
    pub external_id: Option<String>,
    pub import_status: ImportStatus,
    pub is_active: bool,
    pub variants: Vec<Variant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Unique within its product, not globally.
    pub id: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub price: Money,
    /// Descriptive only; never consulted during resolution.
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus { #[default] Draft, Published }

impl Variant {
    /// The image set this variant brings along, if any.
    pub fn own_images(&self) -> Option<Vec<String>> {
        if !self.images.is_empty() {
            Some(self.images.clone())
        } else {
            self.image.as_ref().map(|img| vec![img.clone()])
        }
    }
}

impl Product {
    /// A freshly imported listing; callers fill in images, variants and
    /// provenance afterwards.
    pub fn draft(id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>, price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            image: None,
            images: vec![],
            category: None,
            stock: 0,
            price,
            original_price: None,
            source_url: None,
            external_id: None,
            import_status: ImportStatus::Draft,
            is_active: true,
            variants: vec![],
            created_at: now,
            updated_at: now,
            events: vec![],
        }
    }

    pub fn is_published(&self) -> bool { self.is_active && self.import_status == ImportStatus::Published }
    pub fn has_variants(&self) -> bool { !self.variants.is_empty() }

    pub fn display_images(&self) -> Vec<String> {
        if !self.images.is_empty() {
            self.images.clone()
        } else if let Some(image) = &self.image {
            vec![image.clone()]
        } else {
            Vec::new()
        }
    }

    pub fn publish(&mut self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() { return Err(ProductError::MissingName); }
        self.import_status = ImportStatus::Published;
        self.touch();
        self.raise_event(DomainEvent::Product(ProductEvent::Published { product_id: self.id.clone() }));
        Ok(())
    }

    pub fn update_price(&mut self, new_price: Money) {
        self.price = new_price;
        self.touch();
    }

    pub fn set_variant_price(&mut self, variant_id: &str, price: Money) -> Result<(), ProductError> {
        let variant = self.variants.iter_mut().find(|v| v.id == variant_id).ok_or(ProductError::UnknownVariant)?;
        variant.price = price;
        self.touch();
        Ok(())
    }

    /// Drops one image, keeping the primary image aligned with the new head.
    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
            self.image = self.images.first().cloned();
            self.touch();
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    pub(crate) fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    pub(crate) fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone)] pub enum ProductError { MissingName, UnknownVariant }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::MissingName => write!(f, "Missing name"), Self::UnknownVariant => write!(f, "Unknown variant") }
    }
}
