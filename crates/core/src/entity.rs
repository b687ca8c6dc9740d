//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Cart lines are entities keyed by the product they hold: two lines with the
/// same product id are the same line, whatever their quantity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
