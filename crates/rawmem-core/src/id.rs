//! Strongly-typed identifiers and the [`FieldOffsets`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies an unboxed type within a type registry.
///
/// Types are defined once at load time and assigned sequential IDs.
/// `UnboxedTypeId(n)` corresponds to the n-th type defined in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnboxedTypeId(pub u32);

impl fmt::Display for UnboxedTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UnboxedTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Byte offsets of the fields of an unboxed type, in declaration order.
///
/// Uses `SmallVec<[u64; 4]>` because native-width types rarely carry
/// more than a handful of raw fields. Larger compositions spill to the
/// heap transparently.
pub type FieldOffsets = SmallVec<[u64; 4]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_displays_inner_value() {
        assert_eq!(UnboxedTypeId(7).to_string(), "7");
        assert_eq!(UnboxedTypeId::from(3), UnboxedTypeId(3));
    }

    #[test]
    fn field_offsets_stay_inline_for_small_types() {
        let offsets: FieldOffsets = [0, 8, 16].into_iter().collect();
        assert!(!offsets.spilled());
        assert_eq!(offsets.as_slice(), &[0, 8, 16]);
    }
}
