//! Collaborator traits at the layout/scan boundary.
//!
//! The declaration model exposes [`InlineLayout`] facts. The allocator
//! consumes them through [`InlinePlacer`] to place regions inside enclosing
//! records; the collector's scanner is driven through [`SlotVisitor`] and
//! only ever sees reference slots, never bytes inside an opaque region.

use crate::id::FieldOffsets;

/// Size, alignment and scan facts about an inline raw region.
///
/// Implemented by unboxed types. All answers are fixed at definition time,
/// so implementors are immutable and can be queried from any thread.
pub trait InlineLayout {
    /// Number of bytes an inline instance occupies.
    fn required_byte_size(&self) -> u64;

    /// Alignment the enclosing layout must honour when placing an instance.
    fn required_alignment(&self) -> u64;

    /// Byte offset of each field relative to the start of the region.
    fn field_offsets(&self) -> FieldOffsets;

    /// Whether the collector may treat the whole region as raw bytes.
    ///
    /// When `true`, no sub-range of the region is ever interpreted as a
    /// reference, relocated, or traced through.
    fn is_opaque_to_scanning(&self) -> bool;
}

/// Places inline regions within an enclosing layout.
///
/// Implemented by the allocator/layout subsystem. The placer is
/// responsible for satisfying [`InlineLayout::required_alignment`] and for
/// rejecting regions that are not opaque to scanning.
pub trait InlinePlacer {
    /// Error returned when a region cannot be placed.
    type Error;

    /// Reserve space for `layout` under `name`, returning its byte offset.
    fn place_inline(&mut self, name: &str, layout: &dyn InlineLayout) -> Result<u64, Self::Error>;
}

/// Receives the reference slots of an object during scanning.
///
/// Implemented by the collector. A scanner calls
/// [`visit_reference`](SlotVisitor::visit_reference) once per reference
/// slot and never for bytes inside an opaque region.
pub trait SlotVisitor {
    /// Visit the reference slot at `slot_offset` holding `raw_value`.
    fn visit_reference(&mut self, slot_offset: u64, raw_value: u64);
}

impl<F: FnMut(u64, u64)> SlotVisitor for F {
    fn visit_reference(&mut self, slot_offset: u64, raw_value: u64) {
        self(slot_offset, raw_value)
    }
}
