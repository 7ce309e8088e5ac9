//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Calendar keys
/// such as [`crate::YearMonth`] are the canonical example: two `2025-03` keys
/// are the same month no matter which posting they were derived from. To
/// "modify" one, derive a new value (`add_months`) instead.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
