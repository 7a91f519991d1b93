use serde::{Deserialize, Serialize};
use uuid::Uuid;

use costbook_core::ProductId;

/// Envelope for an event, containing stream metadata.
///
/// Every product owns one append-only stream; `sequence_number` is 1-based and
/// increases by one per appended event within that stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    product_id: ProductId,
    event_type: String,
    schema_version: u32,

    /// Monotonically increasing position in the product stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        product_id: ProductId,
        event_type: impl Into<String>,
        schema_version: u32,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            product_id,
            event_type: event_type.into(),
            schema_version,
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: crate::Event> EventEnvelope<E> {
    /// Wrap an event at the given stream position, taking its type and schema
    /// version from the event.
    pub fn wrap(product_id: ProductId, sequence_number: u64, payload: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            product_id,
            payload.event_type(),
            payload.schema_version(),
            sequence_number,
            payload,
        )
    }
}
