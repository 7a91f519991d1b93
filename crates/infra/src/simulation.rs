//! Bulk simulation: random purchases and sales against existing products.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use costbook_core::{DomainError, Money, ProductId};
use costbook_inventory::{BatchIdGenerator, Clock};

use crate::config::CostbookConfig;
use crate::journal::TransactionJournal;
use crate::service::{InventoryService, ServiceError};
use crate::store::ProductStore;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    pub min_count: usize,
    pub max_count: usize,
    pub max_purchase_quantity: u64,
    /// Upper bound for a random unit cost, in cents.
    pub max_unit_cost_cents: i64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::from_config(&CostbookConfig::default())
    }
}

impl SimulationSettings {
    pub fn from_config(config: &CostbookConfig) -> Self {
        let cents = (config.max_unit_cost.amount() * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(i64::MAX);

        Self {
            min_count: config.simulation_min.max(1),
            max_count: config.simulation_max.max(config.simulation_min.max(1)),
            max_purchase_quantity: config.max_purchase_quantity.max(1),
            max_unit_cost_cents: cents.max(1),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Simulator {
    settings: SimulationSettings,
}

impl Simulator {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Number of transactions for one bulk run.
    pub fn random_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.settings.min_count..=self.settings.max_count)
    }

    /// Apply `count` random transactions through `service`.
    ///
    /// A product with stock is sold from half of the time, never more than it
    /// holds; otherwise it is restocked. A sale that finds the stock already
    /// drained by a concurrent caller becomes a restock, so every step records
    /// one transaction. Fails only if there are no products or the service
    /// itself fails.
    pub fn run<S, J, G, C, R>(
        &self,
        service: &InventoryService<S, J, G, C>,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Transaction>, ServiceError>
    where
        S: ProductStore,
        J: TransactionJournal,
        G: BatchIdGenerator,
        C: Clock + Clone,
        R: Rng + ?Sized,
    {
        let product_ids: Vec<ProductId> = service
            .list_products()?
            .into_iter()
            .map(|row| row.id)
            .collect();

        if product_ids.is_empty() {
            return Err(DomainError::invalid_operation(
                "simulation requires at least one product",
            )
            .into());
        }

        let mut applied = Vec::with_capacity(count);
        for _ in 0..count {
            let product_id = product_ids[rng.gen_range(0..product_ids.len())];
            let on_hand = service.product(product_id)?.current_quantity();

            let transaction = if on_hand > 0 && rng.gen_bool(0.5) {
                match service.sale(product_id, rng.gen_range(1..=on_hand)) {
                    Ok(sale) => sale,
                    // Another caller drained the stock after `on_hand` was read.
                    Err(ServiceError::Domain(DomainError::InsufficientInventory { .. })) => {
                        self.restock(service, product_id, rng)?
                    }
                    Err(e) => return Err(e),
                }
            } else {
                self.restock(service, product_id, rng)?
            };
            applied.push(transaction);
        }

        info!(count = applied.len(), products = product_ids.len(), "simulation finished");
        Ok(applied)
    }

    fn restock<S, J, G, C, R>(
        &self,
        service: &InventoryService<S, J, G, C>,
        product_id: ProductId,
        rng: &mut R,
    ) -> Result<Transaction, ServiceError>
    where
        S: ProductStore,
        J: TransactionJournal,
        G: BatchIdGenerator,
        C: Clock + Clone,
        R: Rng + ?Sized,
    {
        let quantity = rng.gen_range(1..=self.settings.max_purchase_quantity);
        let cents = rng.gen_range(1..=self.settings.max_unit_cost_cents);
        service.purchase(product_id, quantity, Money::from_cents(cents))
    }
}
