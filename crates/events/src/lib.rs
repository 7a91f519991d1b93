//! Domain events and their stream envelopes.
//!
//! Recorded purchases and sales are facts appended to a per-product stream;
//! this crate holds the event contract and the envelope carrying stream
//! position metadata.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
