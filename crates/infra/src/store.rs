//! Product snapshot storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use costbook_core::{AggregateRoot, DomainError, ExpectedVersion, ProductId};
use costbook_inventory::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("product {0} already exists")]
    AlreadyExists(ProductId),

    /// Optimistic concurrency failure (stale snapshot version).
    #[error("concurrency conflict: {0}")]
    Concurrency(String),

    /// The snapshot breaks its own conservation invariants.
    #[error("rejected snapshot: {0}")]
    InvalidSnapshot(DomainError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage for the latest snapshot of each product.
pub trait ProductStore: Send + Sync {
    fn get(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Store a product that does not exist yet.
    fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// Replace the stored snapshot, provided the stored version is `expected`.
    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<Product>, StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn get(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(product_id)
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert(product)
    }

    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(product, expected)
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list()
    }
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl ProductStore for InMemoryProductStore {
    fn get(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&product_id).cloned())
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        product.check_invariants().map_err(StoreError::InvalidSnapshot)?;

        let mut map = self.inner.write().map_err(poisoned)?;
        let id = product.id_typed();
        if map.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        map.insert(id, product);
        Ok(())
    }

    fn save(&self, product: Product, expected: ExpectedVersion) -> Result<(), StoreError> {
        product.check_invariants().map_err(StoreError::InvalidSnapshot)?;

        let mut map = self.inner.write().map_err(poisoned)?;
        let id = product.id_typed();
        let current = map.get(&id).ok_or(StoreError::NotFound(id))?;

        expected
            .check(current.version())
            .map_err(|e| StoreError::Concurrency(e.to_string()))?;
        if product.version() <= current.version() {
            return Err(StoreError::Concurrency(format!(
                "snapshot version {} does not advance stored version {}",
                product.version(),
                current.version()
            )));
        }

        map.insert(id, product);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().cloned().collect())
    }
}
