//! Valuation engine: applies purchases and sales to product snapshots.

use chrono::{DateTime, Utc};
use tracing::debug;

use costbook_core::{AggregateRoot, DomainError, DomainResult, Money};

use crate::batch::{FifoDetail, InventoryBatch};
use crate::identity::{BatchIdGenerator, Clock, SystemClock, UuidV7BatchIds};
use crate::ledger::{BatchLedger, ConsumptionPlan};
use crate::product::Product;

/// Result of a successful sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOutcome {
    /// Snapshot after the sale.
    pub product: Product,
    /// Layers consumed, in FIFO order.
    pub fifo_details: Vec<FifoDetail>,
    /// Cost of goods sold.
    pub total_cost: Money,
}

/// Applies purchases and sales to product snapshots.
///
/// Operations are synchronous and pure with respect to their input: they take
/// `&Product` and return a new snapshot (or an error, with nothing changed).
/// Callers must serialize operations per product, reading the latest snapshot
/// before each call and storing the returned one before the next.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine<G = UuidV7BatchIds, C = SystemClock> {
    ids: G,
    clock: C,
}

impl ValuationEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, C> ValuationEngine<G, C>
where
    G: BatchIdGenerator,
    C: Clock,
{
    pub fn with_parts(ids: G, clock: C) -> Self {
        Self { ids, clock }
    }

    /// Acquire `quantity` units at `unit_cost`, dated now.
    pub fn apply_purchase(
        &self,
        product: &Product,
        quantity: u64,
        unit_cost: Money,
    ) -> DomainResult<Product> {
        self.apply_purchase_at(product, quantity, unit_cost, self.clock.now())
    }

    /// Acquire `quantity` units at `unit_cost` as one new batch dated `purchased_at`.
    pub fn apply_purchase_at(
        &self,
        product: &Product,
        quantity: u64,
        unit_cost: Money,
        purchased_at: DateTime<Utc>,
    ) -> DomainResult<Product> {
        if quantity == 0 {
            return Err(DomainError::invalid_operation(
                "purchase quantity must be positive",
            ));
        }
        if unit_cost.is_negative() {
            return Err(DomainError::invalid_operation(
                "unit cost cannot be negative",
            ));
        }

        let product_id = product.id_typed();
        let sequence = product.next_batch_sequence();
        let batch = InventoryBatch::acquired(
            self.ids.next_id(product_id, sequence),
            product_id,
            quantity,
            unit_cost,
            purchased_at,
            sequence,
        );
        let batch_id = batch.id_typed();

        let mut batches = Vec::with_capacity(product.batches().len() + 1);
        batches.extend_from_slice(product.batches());
        batches.push(batch);

        let next = product.succeeded_by(batches)?;

        debug!(
            product_id = %product_id,
            batch_id = %batch_id,
            quantity,
            unit_cost = %unit_cost,
            current_quantity = next.current_quantity(),
            total_cost = %next.total_cost(),
            version = next.version(),
            "purchase applied"
        );

        Ok(next)
    }

    /// Plan a sale without applying it.
    pub fn plan_sale(&self, product: &Product, quantity: u64) -> DomainResult<ConsumptionPlan> {
        BatchLedger::new(product.batches()).plan_consumption(quantity)
    }

    /// Sell `quantity` units, consuming batches oldest first.
    pub fn apply_sale(&self, product: &Product, quantity: u64) -> DomainResult<SaleOutcome> {
        let plan = self.plan_sale(product, quantity)?;
        let next = apply_plan(product, &plan)?;
        let (total_cost, fifo_details) = plan.into_parts();

        debug!(
            product_id = %product.id_typed(),
            quantity,
            batches_touched = fifo_details.len(),
            cost_of_goods_sold = %total_cost,
            current_quantity = next.current_quantity(),
            total_cost = %next.total_cost(),
            version = next.version(),
            "sale applied"
        );

        Ok(SaleOutcome {
            product: next,
            fifo_details,
            total_cost,
        })
    }
}

/// Draw each planned batch down by its planned quantity.
fn apply_plan(product: &Product, plan: &ConsumptionPlan) -> DomainResult<Product> {
    let mut batches = product.batches().to_vec();

    for detail in plan.details() {
        let slot = batches
            .iter_mut()
            .find(|b| b.id_typed() == detail.batch_id)
            .ok_or_else(|| {
                DomainError::invariant(format!("planned batch {} not found", detail.batch_id))
            })?;

        *slot = slot.drawn_down(detail.quantity).ok_or_else(|| {
            DomainError::invariant(format!(
                "planned {} units from batch {} holding {}",
                detail.quantity,
                detail.batch_id,
                slot.remaining_quantity()
            ))
        })?;
    }

    let next = product.succeeded_by(batches)?;
    if next.current_quantity() + plan.quantity() != product.current_quantity() {
        return Err(DomainError::invariant(
            "sale did not remove exactly the planned quantity",
        ));
    }
    Ok(next)
}
