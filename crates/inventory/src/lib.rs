//! FIFO inventory valuation.
//!
//! This crate contains the costing rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - [`BatchLedger`] plans which cost layers pay for a sale, oldest first.
//! - [`ValuationEngine`] applies purchases and sales to [`Product`] snapshots
//!   and keeps quantity, total cost and average cost consistent with the
//!   batches.

pub mod batch;
pub mod engine;
pub mod identity;
pub mod ledger;
pub mod product;

pub use batch::{FifoDetail, InventoryBatch};
pub use engine::{SaleOutcome, ValuationEngine};
pub use identity::{
    BatchIdGenerator, Clock, FixedClock, SequenceBatchIds, SystemClock, UuidV7BatchIds,
};
pub use ledger::{BatchLedger, ConsumptionPlan, plan_consumption};
pub use product::{Product, ProductValuation};
