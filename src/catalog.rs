//! Catalog boundary
//!
//! Read/write access to the listing catalog. The storage engine behind it
//! belongs to the deployment; the in-memory implementation backs the
//! service by default and the tests always.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::aggregates::Product;
use crate::{Error, Result};

pub trait Catalog: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Product>>;
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<Product>>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    /// Active, published listings, newest first.
    fn list_published(&self) -> Result<Vec<Product>>;
    fn upsert(&self, product: Product) -> Result<()>;
}

/// Catalog over a shared in-process map. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self { Self::default() }

    fn locked(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Product>>> {
        self.products.read().map_err(|_| Error::Storage("catalog lock poisoned".into()))
    }
}

impl Catalog for InMemoryCatalog {
    fn get(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.locked()?.get(id).cloned())
    }

    fn find_by_external_id(&self, external_id: &str) -> Result<Option<Product>> {
        Ok(self
            .locked()?
            .values()
            .find(|p| p.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self.locked()?.values().find(|p| p.slug == slug).cloned())
    }

    fn list_published(&self) -> Result<Vec<Product>> {
        let mut published: Vec<Product> = self
            .locked()?
            .values()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(published)
    }

    fn upsert(&self, product: Product) -> Result<()> {
        let mut products = self
            .products
            .write()
            .map_err(|_| Error::Storage("catalog lock poisoned".into()))?;
        products.insert(product.id.clone(), product);
        Ok(())
    }
}
