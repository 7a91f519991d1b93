use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use costbook_core::{BatchId, Entity, Money, ProductId, ValueObject};

/// One cost layer: units acquired together, at one unit cost.
///
/// `quantity`, `unit_cost` and `purchase_date` never change after creation.
/// `remaining_quantity` only goes down, and stays within `0..=quantity`.
/// A drained batch is kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBatch {
    id: BatchId,
    product_id: ProductId,
    quantity: u64,
    unit_cost: Money,
    remaining_quantity: u64,
    purchase_date: DateTime<Utc>,
    sequence: u64,
}

impl InventoryBatch {
    /// A freshly acquired, untouched batch.
    pub fn acquired(
        id: BatchId,
        product_id: ProductId,
        quantity: u64,
        unit_cost: Money,
        purchase_date: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            product_id,
            quantity,
            unit_cost,
            remaining_quantity: quantity,
            purchase_date,
            sequence,
        }
    }

    pub fn id_typed(&self) -> BatchId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn unit_cost(&self) -> Money {
        self.unit_cost
    }

    pub fn remaining_quantity(&self) -> u64 {
        self.remaining_quantity
    }

    pub fn purchase_date(&self) -> DateTime<Utc> {
        self.purchase_date
    }

    /// Creation order within the owning product (1-based).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Key defining FIFO precedence: purchase date, then creation order.
    pub fn fifo_key(&self) -> (DateTime<Utc>, u64) {
        (self.purchase_date, self.sequence)
    }

    /// Cost still carried by this batch, or `None` on decimal overflow.
    pub fn remaining_cost(&self) -> Option<Money> {
        self.unit_cost.checked_times(self.remaining_quantity)
    }

    /// Copy of this batch with `units` fewer remaining, or `None` if it holds fewer.
    pub(crate) fn drawn_down(&self, units: u64) -> Option<Self> {
        let remaining_quantity = self.remaining_quantity.checked_sub(units)?;
        Some(Self {
            remaining_quantity,
            ..self.clone()
        })
    }
}

impl Entity for InventoryBatch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One line of a sale's cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FifoDetail {
    pub batch_id: BatchId,
    /// Units taken from the batch.
    pub quantity: u64,
    /// The batch's unit cost at consumption time.
    pub unit_cost: Money,
}

impl ValueObject for FifoDetail {}

impl FifoDetail {
    /// `quantity × unit_cost`.
    pub fn cost(&self) -> Option<Money> {
        self.unit_cost.checked_times(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn batch(quantity: u64, cents: i64) -> InventoryBatch {
        InventoryBatch::acquired(
            BatchId::new(),
            ProductId::new(),
            quantity,
            Money::from_cents(cents),
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            1,
        )
    }

    #[test]
    fn acquired_batch_is_full() {
        let b = batch(10, 200);
        assert_eq!(b.remaining_quantity(), 10);
        assert!(!b.is_depleted());
        assert_eq!(b.remaining_cost(), Some(Money::from_cents(2000)));
    }

    #[test]
    fn drawn_down_keeps_immutable_fields() {
        let b = batch(10, 200);
        let after = b.drawn_down(10).unwrap();
        assert!(after.is_depleted());
        assert_eq!(after.quantity(), 10);
        assert_eq!(after.unit_cost(), b.unit_cost());
        assert_eq!(after.id_typed(), b.id_typed());
        assert_eq!(b.remaining_quantity(), 10);
    }

    #[test]
    fn drawn_down_refuses_to_go_negative() {
        assert_eq!(batch(3, 100).drawn_down(4), None);
    }

    #[test]
    fn fifo_detail_cost() {
        let detail = FifoDetail {
            batch_id: BatchId::new(),
            quantity: 2,
            unit_cost: Money::from_cents(300),
        };
        assert_eq!(detail.cost(), Some(Money::from_cents(600)));
    }
}
