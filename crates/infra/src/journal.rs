//! Append-only transaction journal, one stream per product.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use costbook_core::ProductId;
use costbook_events::EventEnvelope;

use crate::store::StoreError;
use crate::transaction::Transaction;

/// Append-only storage for recorded transactions.
pub trait TransactionJournal: Send + Sync {
    /// Append to the product's stream, assigning the next sequence number.
    fn append(&self, transaction: Transaction) -> Result<EventEnvelope<Transaction>, StoreError>;

    /// One product's stream, oldest first.
    fn load_stream(&self, product_id: ProductId)
    -> Result<Vec<EventEnvelope<Transaction>>, StoreError>;

    /// Every recorded transaction, in append order.
    fn load_all(&self) -> Result<Vec<EventEnvelope<Transaction>>, StoreError>;
}

impl<J> TransactionJournal for Arc<J>
where
    J: TransactionJournal + ?Sized,
{
    fn append(&self, transaction: Transaction) -> Result<EventEnvelope<Transaction>, StoreError> {
        (**self).append(transaction)
    }

    fn load_stream(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<EventEnvelope<Transaction>>, StoreError> {
        (**self).load_stream(product_id)
    }

    fn load_all(&self) -> Result<Vec<EventEnvelope<Transaction>>, StoreError> {
        (**self).load_all()
    }
}

#[derive(Debug, Default)]
struct JournalState {
    log: Vec<EventEnvelope<Transaction>>,
    heads: HashMap<ProductId, u64>,
}

/// In-memory append-only journal.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryTransactionJournal {
    state: RwLock<JournalState>,
}

impl InMemoryTransactionJournal {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl TransactionJournal for InMemoryTransactionJournal {
    fn append(&self, transaction: Transaction) -> Result<EventEnvelope<Transaction>, StoreError> {
        let mut state = self.state.write().map_err(poisoned)?;

        let product_id = transaction.product_id;
        let head = state.heads.entry(product_id).or_insert(0);
        *head += 1;
        let envelope = EventEnvelope::wrap(product_id, *head, transaction);

        state.log.push(envelope.clone());
        Ok(envelope)
    }

    fn load_stream(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<EventEnvelope<Transaction>>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .log
            .iter()
            .filter(|e| e.product_id() == product_id)
            .cloned()
            .collect())
    }

    fn load_all(&self) -> Result<Vec<EventEnvelope<Transaction>>, StoreError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.log.clone())
    }
}
