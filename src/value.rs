//! Permission bitmask value and composition helpers

use serde::{Deserialize, Serialize};

/// A set of capability bits. Each bit is one independently assignable capability;
/// its meaning is given by the role table of a resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionValue(u32);

impl PermissionValue {
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True iff every bit of `required` is also set here
    #[inline]
    #[must_use]
    pub const fn contains(self, required: PermissionValue) -> bool {
        (self.0 & required.0) == required.0
    }

    #[inline]
    #[must_use]
    pub const fn intersects(self, other: PermissionValue) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: PermissionValue) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub const fn difference(self, other: PermissionValue) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for PermissionValue {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for PermissionValue {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for PermissionValue {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<PermissionValue> for u32 {
    fn from(v: PermissionValue) -> Self {
        v.0
    }
}

impl std::fmt::Display for PermissionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl FromIterator<PermissionValue> for PermissionValue {
    fn from_iter<I: IntoIterator<Item = PermissionValue>>(iter: I) -> Self {
        iter.into_iter().fold(Self(0), Self::union)
    }
}

/// Bitwise OR of any number of values. Overlapping bits are not double counted.
#[must_use]
pub const fn sum_per(values: &[PermissionValue]) -> PermissionValue {
    let mut acc = 0;
    let mut i = 0;
    while i < values.len() {
        acc |= values[i].0;
        i += 1;
    }
    PermissionValue(acc)
}

/// The single containment primitive every `has_*` flag reduces to
#[inline]
#[must_use]
pub const fn has_capability(value: PermissionValue, required: PermissionValue) -> bool {
    value.contains(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PermissionValue = PermissionValue::from_bits(0b001);
    const B: PermissionValue = PermissionValue::from_bits(0b010);
    const C: PermissionValue = PermissionValue::from_bits(0b110);

    #[test]
    fn sum_per_is_idempotent_and_associative() {
        assert_eq!(sum_per(&[A, A]), A);
        assert_eq!(sum_per(&[sum_per(&[A, B]), C]), sum_per(&[A, sum_per(&[B, C])]));
        assert_eq!(sum_per(&[B, C]).bits(), 0b110);
        assert_eq!(sum_per(&[]), PermissionValue::default());
    }

    #[test]
    fn containment() {
        assert!(has_capability(C, B));
        assert!(!has_capability(B, C));
        assert!(has_capability(A, PermissionValue::default()));
        assert!(!has_capability(PermissionValue::default(), A));
    }

    #[test]
    fn collect_and_display() {
        let v: PermissionValue = [A, B].into_iter().collect();
        assert_eq!(v.bits(), 0b011);
        assert_eq!(v.to_string(), "0b11");
        assert_eq!(C.difference(B).bits(), 0b100);
    }
}
