//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two instances
/// with the same attribute values are the same value. To "modify" one,
/// construct a new one. A price snapshot on an order line is a value object;
/// the product it was taken from is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
