use serde::{Deserialize, Serialize};

use costbook_core::{AggregateRoot, DomainError, DomainResult, Entity, Money, ProductId};

use crate::batch::InventoryBatch;

/// Product snapshot: identity, derived aggregates and owned cost layers.
///
/// Snapshots are values. Engine operations take `&Product` and return a new
/// one with the same id and `version() + 1`; the input is never modified.
/// `current_quantity`, `total_cost` and `average_cost` are always recomputed
/// from `batches`, never adjusted on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    current_quantity: u64,
    total_cost: Money,
    average_cost: Money,
    batches: Vec<InventoryBatch>,
    version: u64,
}

impl Product {
    /// A new product with no batches and zero quantity/cost.
    pub fn new(id: ProductId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_operation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            current_quantity: 0,
            total_cost: Money::ZERO,
            average_cost: Money::ZERO,
            batches: Vec::new(),
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_quantity(&self) -> u64 {
        self.current_quantity
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    /// `total_cost / current_quantity`, or zero when out of stock.
    pub fn average_cost(&self) -> Money {
        self.average_cost
    }

    /// All batches ever acquired, in insertion order (depleted ones included).
    pub fn batches(&self) -> &[InventoryBatch] {
        &self.batches
    }

    /// Sequence number the next acquired batch will carry.
    pub fn next_batch_sequence(&self) -> u64 {
        self.batches
            .iter()
            .map(InventoryBatch::sequence)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn valuation(&self) -> ProductValuation {
        ProductValuation {
            id: self.id,
            name: self.name.clone(),
            current_quantity: self.current_quantity,
            total_cost: self.total_cost,
            average_cost: self.average_cost,
        }
    }

    /// Next snapshot: same identity, the given batches, aggregates recomputed.
    pub(crate) fn succeeded_by(&self, batches: Vec<InventoryBatch>) -> DomainResult<Product> {
        let (current_quantity, total_cost) = totals(&batches)?;
        Ok(Product {
            id: self.id,
            name: self.name.clone(),
            current_quantity,
            total_cost,
            average_cost: total_cost.per_unit(current_quantity),
            batches,
            version: self.version + 1,
        })
    }

    /// Verify the snapshot's conservation invariants.
    ///
    /// Useful for snapshots that did not come from the engine (deserialized or
    /// loaded from storage).
    pub fn check_invariants(&self) -> DomainResult<()> {
        for batch in &self.batches {
            if batch.product_id() != self.id {
                return Err(DomainError::invariant(format!(
                    "batch {} belongs to product {}",
                    batch.id_typed(),
                    batch.product_id()
                )));
            }
            if batch.remaining_quantity() > batch.quantity() {
                return Err(DomainError::invariant(format!(
                    "batch {} has more remaining than acquired",
                    batch.id_typed()
                )));
            }
            if batch.unit_cost().is_negative() {
                return Err(DomainError::invariant(format!(
                    "batch {} has a negative unit cost",
                    batch.id_typed()
                )));
            }
        }

        let (quantity, total_cost) = totals(&self.batches)?;
        if quantity != self.current_quantity {
            return Err(DomainError::invariant(format!(
                "current quantity {} does not match batches ({quantity})",
                self.current_quantity
            )));
        }
        if total_cost != self.total_cost {
            return Err(DomainError::invariant(format!(
                "total cost {} does not match batches ({total_cost})",
                self.total_cost
            )));
        }
        if self.average_cost != total_cost.per_unit(quantity) {
            return Err(DomainError::invariant("average cost is stale"));
        }
        Ok(())
    }
}

fn totals(batches: &[InventoryBatch]) -> DomainResult<(u64, Money)> {
    let mut quantity: u64 = 0;
    let mut cost = Money::ZERO;
    for batch in batches {
        quantity = quantity
            .checked_add(batch.remaining_quantity())
            .ok_or_else(|| DomainError::invalid_operation("quantity exceeds representable range"))?;
        cost = batch
            .remaining_cost()
            .and_then(|c| cost.checked_add(c))
            .ok_or_else(|| DomainError::invalid_operation("cost exceeds representable range"))?;
    }
    Ok((quantity, cost))
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Product {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Listing row for a product: identity plus its valuation aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductValuation {
    pub id: ProductId,
    pub name: String,
    pub current_quantity: u64,
    pub total_cost: Money,
    pub average_cost: Money,
}
