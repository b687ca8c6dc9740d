//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. `Money` and `PhoneNumber` are value objects; a
/// cart line is an entity (see [`crate::Entity`]).
///
/// Value objects are immutable. To "modify" one, build a new one.
///
/// ```ignore
/// let a = Money::from_minor(2_999);
/// let b = Money::from_minor(2_999);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
