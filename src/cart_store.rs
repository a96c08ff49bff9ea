//! Cart persistence boundary
//!
//! Carts live as JSON blobs in a key-value store, one slot per session.
//! The store itself is whatever the deployment provides; the service only
//! needs get/put/delete on named slots. `CartSessions` layers the session
//! semantics on top: missing or corrupt blobs rehydrate as an empty cart,
//! and every mutation, clearing included, runs under one gate so a stored
//! cart is never overwritten from a stale read.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::aggregates::Cart;
use crate::{Error, Result};

/// Slot prefix shared by every session's cart.
const CART_SLOT: &str = "cart-storage";

pub trait BlobStore: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>>;
    fn put(&self, slot: &str, blob: String) -> Result<()>;
    fn delete(&self, slot: &str) -> Result<()>;
}

/// Blob store over a shared in-process map. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self { Self::default() }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, slot: &str) -> Result<Option<String>> {
        let blobs = self.blobs.read().map_err(|_| Error::Storage("blob store lock poisoned".into()))?;
        Ok(blobs.get(slot).cloned())
    }

    fn put(&self, slot: &str, blob: String) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| Error::Storage("blob store lock poisoned".into()))?;
        blobs.insert(slot.to_string(), blob);
        Ok(())
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| Error::Storage("blob store lock poisoned".into()))?;
        blobs.remove(slot);
        Ok(())
    }
}

/// Session-scoped cart repository.
#[derive(Clone)]
pub struct CartSessions {
    store: Arc<dyn BlobStore>,
    currency: String,
    gate: Arc<Mutex<()>>,
}

impl CartSessions {
    pub fn new(store: Arc<dyn BlobStore>, currency: &str) -> Self {
        Self { store, currency: currency.to_string(), gate: Arc::new(Mutex::new(())) }
    }

    fn slot(session_id: &str) -> String { format!("{CART_SLOT}:{session_id}") }

    /// Loads the session's cart. A session with no stored blob gets an
    /// empty cart; so does one whose blob no longer parses.
    pub fn load(&self, session_id: &str) -> Result<Cart> {
        match self.store.get(&Self::slot(session_id))? {
            None => Ok(Cart::new(&self.currency)),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(cart) => Ok(cart),
                Err(err) => {
                    tracing::warn!(session = %session_id, error = %err, "unreadable cart blob, starting over empty");
                    Ok(Cart::new(&self.currency))
                }
            },
        }
    }

    /// Read-modify-write cycle: under the gate, loads the latest stored
    /// cart, applies the mutation, and writes the result back. Returns the
    /// cart as saved.
    pub fn modify(&self, session_id: &str, mutate: impl FnOnce(&mut Cart)) -> Result<Cart> {
        let _guard = self.gate.lock().map_err(|_| Error::Storage("cart gate poisoned".into()))?;
        let mut cart = self.load(session_id)?;
        mutate(&mut cart);
        let blob = serde_json::to_string(&cart).map_err(|e| Error::Storage(e.to_string()))?;
        self.store.put(&Self::slot(session_id), blob)?;
        Ok(cart)
    }

    /// Drops the session's slot entirely; the next load starts empty.
    /// Takes the same gate as `modify`, so an in-flight cycle can never
    /// write its cart back over the delete.
    pub fn clear(&self, session_id: &str) -> Result<()> {
        let _guard = self.gate.lock().map_err(|_| Error::Storage("cart gate poisoned".into()))?;
        self.store.delete(&Self::slot(session_id))
    }
}
