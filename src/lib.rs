//! Emporium storefront
//!
//! Variant-aware storefront service for imported marketplace listings.
//!
//! ## Features
//! - Listing import with lenient price and variant normalization
//! - Specification axes derived from variants, exact-match resolution
//! - Display pricing with cheapest-variant fallback
//! - Identity-keyed session carts persisted as JSON blobs
//! - Checkout handoff snapshots for the external order collaborator

use thiserror::Error;

pub mod api;
pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod domain;
pub mod import;
pub mod session;

pub use api::{router, AppState};
pub use cart_store::{BlobStore, CartSessions, InMemoryBlobStore};
pub use catalog::{Catalog, InMemoryCatalog};
pub use checkout::CheckoutSnapshot;
pub use domain::aggregates::{Cart, ImportStatus, LineItem, Product, Variant};
pub use domain::browse::{
    cheapest_price, project, resolve, DisplayProjection, Resolution, Selection, SpecAxis,
    SpecificationIndex,
};
pub use domain::value_objects::{normalize_price, Money};
pub use import::{ImportRequest, Importer};
pub use session::ProductView;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum Error {
    #[error("Selection incomplete")]
    SelectionIncomplete,

    #[error("Invalid import: {0}")]
    InvalidImport(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
