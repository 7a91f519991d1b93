//! Replay scripts: a JSON array of operations applied in order.
//!
//! ```json
//! [
//!   { "op": "create", "name": "Widget" },
//!   { "op": "purchase", "product": "Widget", "quantity": 10, "unitPrice": "2.00" },
//!   { "op": "sale", "product": "Widget", "quantity": 4 }
//! ]
//! ```
//!
//! Products are referred to by the name they were created with.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use costbook_core::{Money, ProductId};
use costbook_infra::{InventoryService, ProductStore, TransactionJournal};
use costbook_inventory::{BatchIdGenerator, Clock};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Create {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Purchase {
        product: String,
        quantity: u64,
        unit_price: Money,
    },
    Sale {
        product: String,
        quantity: u64,
    },
}

pub fn parse(raw: &str) -> Result<Vec<Operation>> {
    serde_json::from_str(raw).context("replay script is not a JSON array of operations")
}

/// Apply `operations` in order, stopping at the first failure.
pub fn replay<S, J, G, C>(
    service: &InventoryService<S, J, G, C>,
    operations: &[Operation],
) -> Result<()>
where
    S: ProductStore,
    J: TransactionJournal,
    G: BatchIdGenerator,
    C: Clock + Clone,
{
    let mut products: HashMap<&str, ProductId> = HashMap::new();

    for (index, op) in operations.iter().enumerate() {
        let step = index + 1;
        match op {
            Operation::Create { name } => {
                if products.contains_key(name.as_str()) {
                    bail!("step {step}: product {name:?} created twice");
                }
                let created = service
                    .create_product(name)
                    .with_context(|| format!("step {step}: create {name:?}"))?;
                products.insert(name, created.id);
            }
            Operation::Purchase {
                product,
                quantity,
                unit_price,
            } => {
                let id = lookup(&products, product, step)?;
                service
                    .purchase(id, *quantity, *unit_price)
                    .with_context(|| format!("step {step}: purchase {quantity} of {product:?}"))?;
            }
            Operation::Sale { product, quantity } => {
                let id = lookup(&products, product, step)?;
                service
                    .sale(id, *quantity)
                    .with_context(|| format!("step {step}: sale {quantity} of {product:?}"))?;
            }
        }
    }
    Ok(())
}

fn lookup(products: &HashMap<&str, ProductId>, name: &str, step: usize) -> Result<ProductId> {
    products
        .get(name)
        .copied()
        .ok_or_else(|| anyhow!("step {step}: unknown product {name:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SCRIPT: &str = r#"[
        { "op": "create", "name": "Widget" },
        { "op": "purchase", "product": "Widget", "quantity": 10, "unitPrice": "2.00" },
        { "op": "purchase", "product": "Widget", "quantity": 5, "unitPrice": 3 },
        { "op": "sale", "product": "Widget", "quantity": 12 }
    ]"#;

    #[test]
    fn parses_tagged_operations() {
        let ops = parse(SCRIPT).unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(
            ops[1],
            Operation::Purchase {
                product: "Widget".to_string(),
                quantity: 10,
                unit_price: Money::from_decimal(dec!(2.00)),
            }
        );
    }

    #[test]
    fn replays_against_the_service() {
        let service = InventoryService::in_memory();
        replay(&service, &parse(SCRIPT).unwrap()).unwrap();

        let rows = service.list_products().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].current_quantity, 3);
        assert_eq!(rows[0].total_cost, Money::from_cents(900));
        assert_eq!(service.transactions().unwrap().len(), 3);
    }

    #[test]
    fn unknown_product_stops_the_replay() {
        let service = InventoryService::in_memory();
        let ops = parse(r#"[{ "op": "sale", "product": "Ghost", "quantity": 1 }]"#).unwrap();
        let err = replay(&service, &ops).unwrap_err();
        assert!(err.to_string().contains("unknown product"));
    }

    #[test]
    fn rejects_unknown_op() {
        assert!(parse(r#"[{ "op": "refund", "product": "Widget" }]"#).is_err());
    }
}
