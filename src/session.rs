//! Shopper product view
//!
//! The state a shopper manipulates on one listing's page: the selection,
//! the gallery cursor, and the quantity stepper. Opening a different
//! listing builds a fresh view, which is what keeps selections from one
//! product ever leaking onto another. The view re-resolves on every read;
//! nothing derived is stored.

use std::collections::BTreeMap;

use crate::domain::aggregates::{LineItem, Product};
use crate::domain::browse::{project, resolve, DisplayProjection, Resolution, Selection, SpecificationIndex};
use crate::{Error, Result};

pub struct ProductView {
    product: Product,
    index: SpecificationIndex,
    selection: Selection,
    quantity: u32,
    image_cursor: usize,
}

impl ProductView {
    /// Opens a listing: axes derived from its variants, nothing selected,
    /// quantity one, gallery on the first image.
    pub fn open(product: Product) -> Self {
        let index = SpecificationIndex::from_variants(&product.variants);
        Self { product, index, selection: Selection::new(), quantity: 1, image_cursor: 0 }
    }

    /// Opens a listing with a raw selection already applied; keys the
    /// listing's axes do not know are dropped before they can reach line
    /// identity.
    pub fn open_with_selection(product: Product, raw: BTreeMap<String, String>, quantity: u32) -> Self {
        let mut view = Self::open(product);
        let mut selection = Selection::from(raw);
        selection.retain_known(&view.index);
        view.selection = selection;
        view.quantity = quantity.max(1);
        view
    }

    pub fn product(&self) -> &Product { &self.product }
    pub fn index(&self) -> &SpecificationIndex { &self.index }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn image_cursor(&self) -> usize { self.image_cursor }

    pub fn resolution(&self) -> Resolution<'_> {
        resolve(&self.product.variants, &self.index, &self.selection)
    }

    pub fn display(&self) -> DisplayProjection {
        project(&self.product, &self.resolution())
    }

    /// Toggles one specification value. When the displayed image set comes
    /// out different, the gallery cursor snaps back to the first image.
    pub fn toggle_option(&mut self, key: &str, value: &str) {
        let before = self.display().images;
        self.selection.toggle(key, value);
        if self.display().images != before {
            self.image_cursor = 0;
        }
    }

    pub fn select_image(&mut self, index: usize) {
        let count = self.display().images.len();
        self.image_cursor = if count == 0 { 0 } else { index.min(count - 1) };
    }

    /// Steps the quantity up, capped at stock when stock is tracked.
    pub fn increase_quantity(&mut self) {
        let next = self.quantity.saturating_add(1);
        self.quantity = if self.product.stock > 0 { next.min(self.product.stock) } else { next };
    }

    pub fn decrease_quantity(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    /// Assembles the cart line for the current state: display price frozen
    /// as the unit price, first displayed image as the line image, and the
    /// chosen combination recorded for identity. A listing with options
    /// refuses until every axis carries an offered value; an exact variant
    /// additionally contributes its id.
    pub fn line_item(&self) -> Result<LineItem> {
        let resolution = self.resolution();
        if !self.index.is_empty() && !resolution.fully_selected {
            return Err(Error::SelectionIncomplete);
        }
        let display = project(&self.product, &resolution);
        Ok(LineItem {
            product_id: self.product.id.clone(),
            name: self.product.name.clone(),
            image: display.images.first().cloned(),
            unit_price: display.price,
            quantity: self.quantity,
            specifications: (!self.index.is_empty()).then(|| self.selection.snapshot()),
            variant_id: resolution.variant.map(|v| v.id.clone()),
        })
    }
}
