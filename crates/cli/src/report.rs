//! JSON report printed after a run.

use serde::Serialize;

use costbook_infra::{InventorySummary, Transaction};
use costbook_inventory::ProductValuation;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub products: Vec<ProductValuation>,
    pub summary: InventorySummary,
    pub transactions: Vec<Transaction>,
}

impl Report {
    /// Round every money figure to `scale` decimal places for display.
    pub fn rounded(mut self, scale: u32) -> Self {
        for row in &mut self.products {
            row.total_cost = row.total_cost.round_to(scale);
            row.average_cost = row.average_cost.round_to(scale);
        }
        self.summary.total_inventory_value = self.summary.total_inventory_value.round_to(scale);
        for tx in &mut self.transactions {
            tx.total_cost = tx.total_cost.round_to(scale);
            tx.unit_price = tx.unit_price.map(|price| price.round_to(scale));
            for detail in &mut tx.fifo_details {
                detail.unit_cost = detail.unit_cost.round_to(scale);
            }
        }
        self
    }
}
