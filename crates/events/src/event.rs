use chrono::{DateTime, Utc};

/// A recorded fact about one product's inventory.
///
/// Once journaled an event is never edited; corrections are new events.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name such as `inventory.sale.recorded`.
    fn event_type(&self) -> &'static str;

    /// Payload layout revision, bumped when the serialized shape changes.
    fn schema_version(&self) -> u32 {
        1
    }

    /// Business time of the fact.
    fn occurred_at(&self) -> DateTime<Utc>;
}
