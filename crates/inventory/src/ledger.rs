//! Batch ledger: FIFO consumption planning over a product's cost layers.
//!
//! Planning is pure. [`BatchLedger::plan_consumption`] reads the batches and
//! answers which layers pay for a sale; it never touches `remaining_quantity`.
//! The valuation engine applies the plan, so a failed plan leaves state as is.

use costbook_core::{DomainError, DomainResult, Money};

use crate::batch::{FifoDetail, InventoryBatch};

/// Which batches, in which quantities, pay for a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    total_cost: Money,
    details: Vec<FifoDetail>,
}

impl ConsumptionPlan {
    /// Sum of every debited layer's cost.
    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    /// One line per batch touched, in FIFO order.
    pub fn details(&self) -> &[FifoDetail] {
        &self.details
    }

    /// Units covered by the plan (always the requested sale quantity).
    pub fn quantity(&self) -> u64 {
        self.details.iter().map(|d| d.quantity).sum()
    }

    pub fn into_parts(self) -> (Money, Vec<FifoDetail>) {
        (self.total_cost, self.details)
    }
}

/// Read-only view over one product's batch collection.
#[derive(Debug, Clone, Copy)]
pub struct BatchLedger<'a> {
    batches: &'a [InventoryBatch],
}

impl<'a> BatchLedger<'a> {
    pub fn new(batches: &'a [InventoryBatch]) -> Self {
        Self { batches }
    }

    /// Units still available across all batches.
    pub fn available_quantity(&self) -> u64 {
        self.batches
            .iter()
            .fold(0u64, |acc, b| acc.saturating_add(b.remaining_quantity()))
    }

    /// Batches with stock left, oldest first.
    ///
    /// Ordered by purchase date, ties broken by creation sequence, so the order
    /// is total and the same on every call.
    pub fn fifo_order(&self) -> Vec<&'a InventoryBatch> {
        let mut open: Vec<&InventoryBatch> =
            self.batches.iter().filter(|b| !b.is_depleted()).collect();
        open.sort_by_key(|b| b.fifo_key());
        open
    }

    /// Decide which batches pay for `sale_quantity` units.
    pub fn plan_consumption(&self, sale_quantity: u64) -> DomainResult<ConsumptionPlan> {
        if sale_quantity == 0 {
            return Err(DomainError::invalid_operation(
                "sale quantity must be positive",
            ));
        }

        let available = self.available_quantity();
        if available < sale_quantity {
            return Err(DomainError::insufficient_inventory(sale_quantity, available));
        }

        let mut remaining_to_sell = sale_quantity;
        let mut total_cost = Money::ZERO;
        let mut details = Vec::new();

        for batch in self.fifo_order() {
            if remaining_to_sell == 0 {
                break;
            }

            let taken = remaining_to_sell.min(batch.remaining_quantity());
            let detail = FifoDetail {
                batch_id: batch.id_typed(),
                quantity: taken,
                unit_cost: batch.unit_cost(),
            };

            total_cost = detail
                .cost()
                .and_then(|cost| total_cost.checked_add(cost))
                .ok_or_else(|| DomainError::invalid_operation("sale cost exceeds representable range"))?;
            remaining_to_sell -= taken;
            details.push(detail);
        }

        if remaining_to_sell != 0 {
            // The availability check above makes this unreachable.
            return Err(DomainError::invariant(format!(
                "plan left {remaining_to_sell} units uncovered"
            )));
        }

        Ok(ConsumptionPlan {
            total_cost,
            details,
        })
    }
}

/// Convenience wrapper for [`BatchLedger::plan_consumption`].
pub fn plan_consumption(
    batches: &[InventoryBatch],
    sale_quantity: u64,
) -> DomainResult<ConsumptionPlan> {
    BatchLedger::new(batches).plan_consumption(sale_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use costbook_core::{BatchId, ProductId};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn layer(
        product_id: ProductId,
        quantity: u64,
        cents: i64,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> InventoryBatch {
        InventoryBatch::acquired(
            BatchId::new(),
            product_id,
            quantity,
            Money::from_cents(cents),
            at,
            sequence,
        )
    }

    #[test]
    fn spans_batches_oldest_first() {
        let p = ProductId::new();
        let batches = vec![
            layer(p, 10, 200, t0(), 1),
            layer(p, 5, 300, t0() + Duration::hours(1), 2),
        ];

        let plan = plan_consumption(&batches, 12).unwrap();

        assert_eq!(plan.total_cost(), Money::from_cents(2600));
        assert_eq!(plan.quantity(), 12);
        assert_eq!(plan.details().len(), 2);
        assert_eq!(plan.details()[0].batch_id, batches[0].id_typed());
        assert_eq!(plan.details()[0].quantity, 10);
        assert_eq!(plan.details()[1].batch_id, batches[1].id_typed());
        assert_eq!(plan.details()[1].quantity, 2);
        assert_eq!(plan.details()[1].unit_cost, Money::from_cents(300));
    }

    #[test]
    fn orders_by_purchase_date_not_position() {
        let p = ProductId::new();
        // Inserted newest first: a backdated purchase.
        let batches = vec![
            layer(p, 4, 900, t0() + Duration::days(2), 1),
            layer(p, 4, 100, t0(), 2),
        ];

        let plan = plan_consumption(&batches, 5).unwrap();

        assert_eq!(plan.details()[0].batch_id, batches[1].id_typed());
        assert_eq!(plan.details()[0].quantity, 4);
        assert_eq!(plan.details()[1].quantity, 1);
        assert_eq!(plan.total_cost(), Money::from_cents(400 + 900));
    }

    #[test]
    fn equal_dates_fall_back_to_sequence() {
        let p = ProductId::new();
        let batches = vec![layer(p, 3, 500, t0(), 2), layer(p, 3, 100, t0(), 1)];

        let plan = plan_consumption(&batches, 3).unwrap();

        assert_eq!(plan.details().len(), 1);
        assert_eq!(plan.details()[0].batch_id, batches[1].id_typed());
    }

    #[test]
    fn skips_depleted_batches() {
        let p = ProductId::new();
        let drained = layer(p, 10, 200, t0(), 1).drawn_down(10).unwrap();
        let batches = vec![drained, layer(p, 5, 300, t0() + Duration::hours(1), 2)];

        let plan = plan_consumption(&batches, 1).unwrap();

        assert_eq!(plan.details().len(), 1);
        assert_eq!(plan.details()[0].batch_id, batches[1].id_typed());
    }

    #[test]
    fn insufficient_inventory_reports_requested_and_available() {
        let p = ProductId::new();
        let batches = vec![layer(p, 3, 300, t0(), 1)];

        let err = plan_consumption(&batches, 4).unwrap_err();
        assert_eq!(err, DomainError::insufficient_inventory(4, 3));
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let err = plan_consumption(&[], 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidOperation(_)));
    }

    #[test]
    fn empty_ledger_has_nothing_available() {
        let err = plan_consumption(&[], 1).unwrap_err();
        assert_eq!(err, DomainError::insufficient_inventory(1, 0));
    }

    #[test]
    fn planning_does_not_mutate_batches() {
        let p = ProductId::new();
        let batches = vec![layer(p, 10, 200, t0(), 1)];
        let before = batches.clone();

        let first = plan_consumption(&batches, 7).unwrap();
        let second = plan_consumption(&batches, 7).unwrap();

        assert_eq!(batches, before);
        assert_eq!(first, second);
    }
}
