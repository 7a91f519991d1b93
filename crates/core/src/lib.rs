//! `costbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, monetary amounts, the error taxonomy and the entity/aggregate
//! traits shared by the valuation engine and its callers.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BatchId, ProductId, TransactionId};
pub use money::Money;
pub use value_object::ValueObject;
