//! Inventory service: the transaction-processing layer around the valuation engine.
//!
//! Each operation runs as one read-modify-write unit under a per-product lock:
//!
//! ```text
//! lock(product) → load snapshot → engine → save(expected = snapshot.version) → journal → unlock
//! ```
//!
//! The store's version check backs the lock up: a snapshot computed from a
//! stale predecessor is refused instead of silently double-spending stock.
//! Operations on different products do not contend.
//!
//! The snapshot is the source of truth and is saved before the journal entry
//! is appended. A failed append after a successful save is reported as
//! [`ServiceError::Storage`] and logged at `error` level; the product has
//! advanced and its history is missing that one record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use costbook_core::{AggregateRoot, DomainError, ExpectedVersion, Money, ProductId};
use costbook_events::EventEnvelope;
use costbook_inventory::{
    BatchIdGenerator, Clock, Product, ProductValuation, SystemClock, UuidV7BatchIds,
    ValuationEngine,
};

use crate::journal::{InMemoryTransactionJournal, TransactionJournal};
use crate::store::{InMemoryProductStore, ProductStore, StoreError};
use crate::transaction::Transaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Rejected by the engine (invalid input, insufficient inventory, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Optimistic concurrency failure; reload and retry.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl ServiceError {
    /// True when the request itself was refused and nothing was written.
    pub fn is_rejection(&self) -> bool {
        match self {
            ServiceError::Domain(e) => e.is_caller_correctable(),
            ServiceError::ProductNotFound(_) => true,
            ServiceError::Conflict(_) | ServiceError::Storage(_) => false,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => ServiceError::ProductNotFound(id),
            StoreError::Concurrency(msg) => ServiceError::Conflict(msg),
            StoreError::AlreadyExists(id) => {
                ServiceError::Conflict(format!("product {id} already exists"))
            }
            StoreError::InvalidSnapshot(e) => ServiceError::Domain(e),
            StoreError::Unavailable(msg) => ServiceError::Storage(msg),
        }
    }
}

/// Dashboard totals across all products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: u64,
    pub total_inventory_value: Money,
}

/// Applies purchases and sales to stored products and records them.
pub struct InventoryService<
    S = InMemoryProductStore,
    J = InMemoryTransactionJournal,
    G = UuidV7BatchIds,
    C = SystemClock,
> {
    store: S,
    journal: J,
    engine: ValuationEngine<G, C>,
    clock: C,
    locks: RwLock<HashMap<ProductId, Arc<Mutex<()>>>>,
}

impl InventoryService {
    /// Service over fresh in-memory storage with production ids and clock.
    pub fn in_memory() -> Self {
        Self::new(InMemoryProductStore::new(), InMemoryTransactionJournal::new())
    }
}

impl<S, J> InventoryService<S, J>
where
    S: ProductStore,
    J: TransactionJournal,
{
    pub fn new(store: S, journal: J) -> Self {
        Self::with_engine_parts(store, journal, UuidV7BatchIds, SystemClock)
    }
}

impl<S, J, G, C> InventoryService<S, J, G, C>
where
    S: ProductStore,
    J: TransactionJournal,
    G: BatchIdGenerator,
    C: Clock + Clone,
{
    pub fn with_engine_parts(store: S, journal: J, ids: G, clock: C) -> Self {
        Self {
            store,
            journal,
            engine: ValuationEngine::with_parts(ids, clock.clone()),
            clock,
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new, empty product.
    pub fn create_product(&self, name: &str) -> Result<ProductValuation, ServiceError> {
        let product = Product::new(ProductId::new(), name.trim())?;
        let valuation = product.valuation();
        self.store.insert(product)?;
        info!(product_id = %valuation.id, name = %valuation.name, "product created");
        Ok(valuation)
    }

    /// Record a purchase of `quantity` units at `unit_price` each.
    pub fn purchase(
        &self,
        product_id: ProductId,
        quantity: u64,
        unit_price: Money,
    ) -> Result<Transaction, ServiceError> {
        let result = self.with_product(product_id, |product| {
            let date = self.clock.now();
            let next = self
                .engine
                .apply_purchase_at(product, quantity, unit_price, date)?;
            let transaction = Transaction::purchase(product_id, quantity, unit_price, date)?;
            Ok((next, transaction))
        });

        match &result {
            Ok(envelope) => info!(
                product_id = %product_id,
                quantity,
                unit_price = %unit_price,
                total_cost = %envelope.payload().total_cost,
                sequence = envelope.sequence_number(),
                "purchase recorded"
            ),
            Err(e) if e.is_rejection() => {
                warn!(product_id = %product_id, quantity, error = %e, "purchase rejected")
            }
            Err(e) => error!(product_id = %product_id, quantity, error = %e, "purchase failed"),
        }

        result.map(EventEnvelope::into_payload)
    }

    /// Record a sale of `quantity` units, costed FIFO.
    pub fn sale(&self, product_id: ProductId, quantity: u64) -> Result<Transaction, ServiceError> {
        let result = self.with_product(product_id, |product| {
            let outcome = self.engine.apply_sale(product, quantity)?;
            let transaction = Transaction::sale(product_id, quantity, &outcome, self.clock.now());
            Ok((outcome.product, transaction))
        });

        match &result {
            Ok(envelope) => info!(
                product_id = %product_id,
                quantity,
                total_cost = %envelope.payload().total_cost,
                batches_touched = envelope.payload().fifo_details.len(),
                sequence = envelope.sequence_number(),
                "sale recorded"
            ),
            Err(e) if e.is_rejection() => {
                warn!(product_id = %product_id, quantity, error = %e, "sale rejected")
            }
            Err(e) => error!(product_id = %product_id, quantity, error = %e, "sale failed"),
        }

        result.map(EventEnvelope::into_payload)
    }

    /// Latest snapshot of one product.
    pub fn product(&self, product_id: ProductId) -> Result<Product, ServiceError> {
        self.store
            .get(product_id)?
            .ok_or(ServiceError::ProductNotFound(product_id))
    }

    /// Valuation rows for every product, ordered by name then id.
    pub fn list_products(&self) -> Result<Vec<ProductValuation>, ServiceError> {
        let mut rows: Vec<ProductValuation> =
            self.store.list()?.iter().map(Product::valuation).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    /// Every recorded transaction, newest first.
    pub fn transactions(&self) -> Result<Vec<Transaction>, ServiceError> {
        Ok(newest_first(self.journal.load_all()?))
    }

    /// One product's transactions, newest first.
    pub fn transactions_for(&self, product_id: ProductId) -> Result<Vec<Transaction>, ServiceError> {
        if self.store.get(product_id)?.is_none() {
            return Err(ServiceError::ProductNotFound(product_id));
        }
        Ok(newest_first(self.journal.load_stream(product_id)?))
    }

    /// Totals across all products.
    ///
    /// Each snapshot is in range on its own; the cross-product totals may not
    /// be, which is reported rather than wrapped.
    pub fn summary(&self) -> Result<InventorySummary, ServiceError> {
        let products = self.store.list()?;

        let total_units = products
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.current_quantity()))
            .ok_or_else(|| {
                DomainError::invalid_operation("total units exceed representable range")
            })?;
        let total_inventory_value = Money::checked_sum(products.iter().map(Product::total_cost))
            .ok_or_else(|| {
                DomainError::invalid_operation("total inventory value exceeds representable range")
            })?;

        Ok(InventorySummary {
            total_products: products.len(),
            total_units,
            total_inventory_value,
        })
    }

    fn product_lock(&self, product_id: ProductId) -> Result<Arc<Mutex<()>>, ServiceError> {
        if let Some(lock) = self.locks.read().map_err(poisoned)?.get(&product_id) {
            return Ok(Arc::clone(lock));
        }
        let mut locks = self.locks.write().map_err(poisoned)?;
        Ok(Arc::clone(locks.entry(product_id).or_default()))
    }

    /// Run one read-modify-write step against a product while holding its lock.
    ///
    /// Order: save the new snapshot, then append the transaction.
    fn with_product<F>(
        &self,
        product_id: ProductId,
        step: F,
    ) -> Result<EventEnvelope<Transaction>, ServiceError>
    where
        F: FnOnce(&Product) -> Result<(Product, Transaction), ServiceError>,
    {
        let lock = self.product_lock(product_id)?;
        // Unit mutex: a poisoned lock guards no state.
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self
            .store
            .get(product_id)?
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        let (next, transaction) = step(&current)?;
        let version = next.version();
        self.store
            .save(next, ExpectedVersion::Exact(current.version()))?;

        self.journal.append(transaction).map_err(|e| {
            error!(
                product_id = %product_id,
                version,
                error = %e,
                "snapshot saved but journal append failed"
            );
            ServiceError::Storage(format!(
                "product {product_id} saved at version {version} without a journal entry: {e}"
            ))
        })
    }
}

fn poisoned<T>(_: T) -> ServiceError {
    ServiceError::Storage("lock table poisoned".to_string())
}

fn newest_first(mut envelopes: Vec<EventEnvelope<Transaction>>) -> Vec<Transaction> {
    // Reverse first so the stable sort keeps later appends ahead on equal dates.
    envelopes.reverse();
    envelopes.sort_by(|a, b| b.payload().date.cmp(&a.payload().date));
    envelopes.into_iter().map(EventEnvelope::into_payload).collect()
}
