//! Identity that survives snapshot replacement.

/// Something tracked by identity rather than by value.
///
/// A product keeps its identity while every operation replaces its snapshot;
/// a batch keeps its identity while its remaining quantity drains.
pub trait Entity {
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Whether `other` is a snapshot of the same entity, regardless of state.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
