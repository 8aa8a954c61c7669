//! Local cart store for visitors without an authenticated identity.
//!
//! The cart lives under a single well-known storage key as a serialized
//! sequence of line items, unique by `(product, color)`. The store never
//! fails its callers: unreadable or malformed state degrades to an empty
//! cart and write failures are swallowed, both logged for diagnostics.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use voltfront_core::{CartLineItem, ColorId, ProductId};

use crate::storage::CartStorage;

/// Storage key holding the serialized anonymous cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Locally persisted cart, created lazily on the first add and cleared
/// exactly once after a successful sync to the server.
///
/// Writes replace the full cart, so concurrent adds from two contexts are
/// last-write-wins: the losing context's increment is dropped. There is no
/// cross-context locking.
#[derive(Clone)]
pub struct LocalCartStore {
    storage: Arc<dyn CartStorage>,
}

impl LocalCartStore {
    /// Create a store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self { storage }
    }

    /// Read the persisted cart.
    ///
    /// Absent, corrupted, or unreadable storage degrades to an empty cart;
    /// the failure is logged and never reaches the caller.
    #[must_use]
    pub fn read(&self) -> Vec<CartLineItem> {
        let raw = match self.storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read local cart");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "discarding malformed local cart");
                Vec::new()
            }
        }
    }

    /// Persist the full cart, replacing whatever was stored.
    ///
    /// Failures (quota, disabled storage) are swallowed and logged; they
    /// must not interrupt the caller's flow.
    pub fn write(&self, cart: &[CartLineItem]) {
        let raw = match serde_json::to_string(cart) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize local cart");
                return;
            }
        };

        if let Err(e) = self.storage.store(CART_STORAGE_KEY, &raw) {
            warn!(error = %e, "failed to persist local cart");
        }
    }

    /// Merge an item into the cart and persist the result.
    ///
    /// An existing `(product, color)` line has its quantity incremented;
    /// otherwise a new line is appended with `added_at` set to now.
    /// Increments are additive and never capped.
    pub fn add_item(
        &self,
        product_id: ProductId,
        color_id: Option<ColorId>,
        quantity: u32,
    ) -> Vec<CartLineItem> {
        let mut cart = self.read();

        if let Some(line) = cart.iter_mut().find(|l| l.key() == (product_id, color_id)) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            cart.push(CartLineItem {
                product_id,
                color_id,
                quantity,
                added_at: Some(Utc::now()),
            });
        }

        self.write(&cart);
        cart
    }

    /// Total units across all lines; 0 for an empty or unreadable cart.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.read().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop the persisted cart entirely.
    ///
    /// Called once after a successful sync to the server. Failures are
    /// swallowed and logged.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(CART_STORAGE_KEY) {
            warn!(error = %e, "failed to clear local cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::{MemoryStorage, StorageError};

    fn store() -> LocalCartStore {
        LocalCartStore::new(Arc::new(MemoryStorage::new()))
    }

    /// Backend that fails every operation, for exercising degraded paths.
    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey("broken".to_owned()))
        }

        fn store(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey("broken".to_owned()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey("broken".to_owned()))
        }
    }

    #[test]
    fn test_add_same_line_twice_merges_quantities() {
        let store = store();
        store.add_item(ProductId::new(5), None, 2);
        let cart = store.add_item(ProductId::new(5), None, 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_id, ProductId::new(5));
        assert_eq!(cart[0].color_id, None);
        assert_eq!(cart[0].quantity, 5);
    }

    #[test]
    fn test_same_product_different_colors_are_distinct_lines() {
        let store = store();
        store.add_item(ProductId::new(5), Some(ColorId::new(1)), 1);
        let cart = store.add_item(ProductId::new(5), Some(ColorId::new(2)), 1);

        assert_eq!(cart.len(), 2);
        assert_eq!(store.total_quantity(), 2);
    }

    #[test]
    fn test_no_color_and_color_are_distinct_lines() {
        let store = store();
        store.add_item(ProductId::new(5), None, 1);
        let cart = store.add_item(ProductId::new(5), Some(ColorId::new(1)), 1);

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_total_quantity_sums_all_lines() {
        let store = store();
        assert_eq!(store.total_quantity(), 0);

        store.add_item(ProductId::new(1), None, 2);
        store.add_item(ProductId::new(2), Some(ColorId::new(7)), 3);
        assert_eq!(store.total_quantity(), 5);
    }

    #[test]
    fn test_corrupted_storage_degrades_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .store(CART_STORAGE_KEY, "{not valid json")
            .expect("seed");

        let store = LocalCartStore::new(storage);
        assert!(store.read().is_empty());
        assert_eq!(store.total_quantity(), 0);

        // A subsequent add starts over from an empty cart.
        let cart = store.add_item(ProductId::new(3), None, 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_unreadable_backend_never_panics() {
        let store = LocalCartStore::new(Arc::new(BrokenStorage));

        assert!(store.read().is_empty());
        assert_eq!(store.total_quantity(), 0);
        // Writes and clears are swallowed.
        let cart = store.add_item(ProductId::new(1), None, 1);
        assert_eq!(cart.len(), 1);
        store.clear();
    }

    #[test]
    fn test_clear_removes_persisted_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalCartStore::new(Arc::clone(&storage) as Arc<dyn CartStorage>);

        store.add_item(ProductId::new(1), None, 1);
        assert!(storage.load(CART_STORAGE_KEY).expect("load").is_some());

        store.clear();
        assert!(storage.load(CART_STORAGE_KEY).expect("load").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_added_at_set_on_first_insertion_only() {
        let store = store();
        let first = store.add_item(ProductId::new(5), None, 1);
        let stamp = first[0].added_at.expect("added_at set");

        let merged = store.add_item(ProductId::new(5), None, 1);
        assert_eq!(merged[0].added_at, Some(stamp));
    }
}
