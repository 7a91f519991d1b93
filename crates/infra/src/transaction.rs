//! Transaction records: what the outside world sees of a purchase or sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use costbook_core::{DomainError, DomainResult, Money, ProductId, TransactionId};
use costbook_events::Event;
use costbook_inventory::{FifoDetail, SaleOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Sale,
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransactionKind::Purchase => f.write_str("purchase"),
            TransactionKind::Sale => f.write_str("sale"),
        }
    }
}

/// A recorded purchase or sale.
///
/// `unit_price` is present for purchases and absent for sales, which are
/// priced by FIFO; `total_cost` is the engine's result in both cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub product_id: ProductId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub quantity: u64,
    pub unit_price: Option<Money>,
    pub total_cost: Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fifo_details: Vec<FifoDetail>,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn purchase(
        product_id: ProductId,
        quantity: u64,
        unit_price: Money,
        date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let total_cost = unit_price
            .checked_times(quantity)
            .ok_or_else(|| DomainError::invalid_operation("purchase cost exceeds representable range"))?;
        Ok(Self {
            id: TransactionId::new(),
            product_id,
            kind: TransactionKind::Purchase,
            quantity,
            unit_price: Some(unit_price),
            total_cost,
            fifo_details: Vec::new(),
            date,
        })
    }

    pub fn sale(product_id: ProductId, quantity: u64, outcome: &SaleOutcome, date: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            product_id,
            kind: TransactionKind::Sale,
            quantity,
            unit_price: None,
            total_cost: outcome.total_cost,
            fifo_details: outcome.fifo_details.clone(),
            date,
        }
    }
}

impl Event for Transaction {
    fn event_type(&self) -> &'static str {
        match self.kind {
            TransactionKind::Purchase => "inventory.purchase.recorded",
            TransactionKind::Sale => "inventory.sale.recorded",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
    }
}
