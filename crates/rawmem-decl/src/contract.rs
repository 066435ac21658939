//! Layout/scan contract queries for composed unboxed types.
//!
//! These are the facts the allocator and the collector's scanner read.
//! [`UnboxedType`] also implements [`InlineLayout`] so collaborators can
//! consume them without depending on this crate's concrete types.

use rawmem_core::{FieldOffsets, InlineLayout};

use crate::compose::{FieldKind, UnboxedType};

/// Whether every byte of `ty` may be treated as raw, untraced memory.
///
/// Walks the field tree: raw storage is opaque, and a nested type is
/// opaque when all of its fields are. Composition admits no other field
/// kinds, so this holds for every type [`compose_type`](crate::compose_type)
/// produces.
pub fn is_opaque_to_scanning(ty: &UnboxedType) -> bool {
    ty.fields().all(|(_, field)| match field.kind() {
        FieldKind::Raw(_) => true,
        FieldKind::Composed(inner) => is_opaque_to_scanning(inner),
    })
}

/// Bytes the allocator must reserve to embed one instance of `ty` inline.
pub fn required_byte_size(ty: &UnboxedType) -> u64 {
    ty.byte_size()
}

/// Alignment the enclosing layout must honour when placing `ty`.
pub fn required_alignment(ty: &UnboxedType) -> u64 {
    ty.alignment()
}

impl InlineLayout for UnboxedType {
    fn required_byte_size(&self) -> u64 {
        required_byte_size(self)
    }

    fn required_alignment(&self) -> u64 {
        required_alignment(self)
    }

    fn field_offsets(&self) -> FieldOffsets {
        self.offsets()
    }

    fn is_opaque_to_scanning(&self) -> bool {
        is_opaque_to_scanning(self)
    }
}
