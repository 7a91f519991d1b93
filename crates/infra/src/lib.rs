//! Infrastructure layer: storage, the inventory service, simulation and config.

pub mod config;
pub mod journal;
pub mod service;
pub mod simulation;
pub mod store;
pub mod transaction;

pub use config::{ConfigError, CostbookConfig};
pub use journal::{InMemoryTransactionJournal, TransactionJournal};
pub use service::{InventoryService, InventorySummary, ServiceError};
pub use simulation::{SimulationSettings, Simulator};
pub use store::{InMemoryProductStore, ProductStore, StoreError};
pub use transaction::{Transaction, TransactionKind};
