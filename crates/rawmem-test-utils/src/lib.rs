//! Test fixtures and mock collaborators for rawmem development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`InlinePlacer`], [`SlotVisitor`]) that record what they were asked to
//! do, plus [`fixtures`] for building common unboxed types.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rawmem_core::{InlineLayout, InlinePlacer, SlotVisitor};

/// One region placed by a [`RecordingPlacer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub offset: u64,
    pub size: u64,
    pub align: u64,
}

/// Mock allocator implementing [`InlinePlacer`].
///
/// Packs regions back to back at their required alignment and records
/// every placement. Regions that are not opaque to scanning are refused,
/// as any conforming allocator must.
#[derive(Default)]
pub struct RecordingPlacer {
    cursor: u64,
    placements: Vec<Placement>,
}

impl RecordingPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placements in the order they were made.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Bytes consumed so far, including alignment gaps.
    pub fn used(&self) -> u64 {
        self.cursor
    }
}

impl InlinePlacer for RecordingPlacer {
    type Error = String;

    fn place_inline(&mut self, name: &str, layout: &dyn InlineLayout) -> Result<u64, String> {
        if !layout.is_opaque_to_scanning() {
            return Err(format!("region '{name}' is scannable"));
        }
        let align = layout.required_alignment().max(1);
        let offset = self.cursor.div_ceil(align) * align;
        let size = layout.required_byte_size();
        self.cursor = offset + size;
        self.placements.push(Placement {
            name: name.to_string(),
            offset,
            size,
            align,
        });
        Ok(offset)
    }
}

/// Mock collector implementing [`SlotVisitor`].
///
/// Records every `(slot_offset, raw_value)` pair it is shown.
#[derive(Default)]
pub struct RecordingVisitor {
    visits: Vec<(u64, u64)>,
}

impl RecordingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visits in the order they were reported.
    pub fn visits(&self) -> &[(u64, u64)] {
        &self.visits
    }

    /// Offsets of the visited slots.
    pub fn offsets(&self) -> Vec<u64> {
        self.visits.iter().map(|&(offset, _)| offset).collect()
    }
}

impl SlotVisitor for RecordingVisitor {
    fn visit_reference(&mut self, slot_offset: u64, raw_value: u64) {
        self.visits.push((slot_offset, raw_value));
    }
}
