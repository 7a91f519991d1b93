//! Injectable sources of batch identity and acquisition time.
//!
//! Production code uses UUIDv7 ids and the system clock. Tests swap in
//! [`SequenceBatchIds`] and [`FixedClock`] so every snapshot is reproducible.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use costbook_core::{BatchId, ProductId};

/// Produces the identifier of a newly acquired batch.
pub trait BatchIdGenerator: Send + Sync {
    /// `sequence` is the new batch's 1-based creation order within `product_id`.
    fn next_id(&self, product_id: ProductId, sequence: u64) -> BatchId;
}

/// Time-ordered prefix plus random suffix (UUIDv7).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7BatchIds;

impl BatchIdGenerator for UuidV7BatchIds {
    fn next_id(&self, _product_id: ProductId, _sequence: u64) -> BatchId {
        BatchId::new()
    }
}

/// Deterministic ids: a name-based UUID (v5) of the batch sequence number,
/// namespaced by the full product id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceBatchIds;

impl BatchIdGenerator for SequenceBatchIds {
    fn next_id(&self, product_id: ProductId, sequence: u64) -> BatchId {
        BatchId::from_uuid(Uuid::new_v5(product_id.as_uuid(), &sequence.to_be_bytes()))
    }
}

/// Source of acquisition timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sequence_ids_are_stable_and_distinct() {
        let product_id = ProductId::new();
        let ids = SequenceBatchIds;
        assert_eq!(ids.next_id(product_id, 1), ids.next_id(product_id, 1));
        assert_ne!(ids.next_id(product_id, 1), ids.next_id(product_id, 2));
    }

    #[test]
    fn sequence_ids_differ_across_products_created_together() {
        let ids = SequenceBatchIds;
        let products: Vec<ProductId> = (0..64).map(|_| ProductId::new()).collect();

        let batch_ids: HashSet<BatchId> = products
            .iter()
            .flat_map(|&p| (1..=3).map(move |seq| ids.next_id(p, seq)))
            .collect();

        assert_eq!(batch_ids.len(), products.len() * 3);
    }

    #[test]
    fn sequence_ids_use_the_whole_product_id() {
        let ids = SequenceBatchIds;
        let a = ProductId::from_uuid(Uuid::from_u128(0x01a1_3e59_6442_7344_9c10_9e8c_0000_0001));
        let b = ProductId::from_uuid(Uuid::from_u128(0x01a1_3e59_6442_7344_9c10_9e8d_0000_0001));
        assert_ne!(ids.next_id(a, 1), ids.next_id(b, 1));
    }
}
