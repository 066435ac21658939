//! Record layouts: reference slots and inline unboxed regions.
//!
//! A [`RecordLayout`] describes an enclosing heap object. Reference slots
//! hold one word each and are the only part of the record the scanner
//! reads. Inline slots embed an unboxed type's raw bytes directly in the
//! record; their byte ranges are recorded as opaque and never scanned.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use rawmem_core::{InlineLayout, InlinePlacer, Platform};
use rawmem_decl::UnboxedType;
use smallvec::SmallVec;

use crate::error::HeapError;

/// What a record slot holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotKind {
    /// A one-word reference to another object.
    Reference,
    /// Raw bytes placed through [`InlinePlacer`] without a known type.
    Opaque,
    /// An unboxed type embedded inline.
    Inline(Arc<UnboxedType>),
}

impl SlotKind {
    /// Whether the scanner must skip this slot.
    pub fn is_opaque(&self) -> bool {
        !matches!(self, Self::Reference)
    }
}

/// Placement of one slot inside a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotLayout {
    /// What the slot holds.
    pub kind: SlotKind,
    /// Byte offset from the start of the record.
    pub offset: u64,
    /// Size of the slot in bytes.
    pub size: u64,
}

impl SlotLayout {
    /// Byte range covered by the slot.
    pub fn range(&self) -> Range<u64> {
        self.offset..self.offset + self.size
    }
}

/// Builds a [`RecordLayout`] slot by slot.
///
/// Slots are placed in the order they are added, each at the next offset
/// its alignment permits. This is where inline regions get aligned; the
/// unboxed types themselves never carry padding.
pub struct RecordLayoutBuilder {
    name: String,
    platform: Platform,
    slots: IndexMap<String, SlotLayout>,
    cursor: u64,
    alignment: u64,
}

impl RecordLayoutBuilder {
    /// Start a layout for a record called `name` on `platform`.
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            platform,
            slots: IndexMap::new(),
            cursor: 0,
            alignment: 1,
        }
    }

    /// Add a one-word, word-aligned reference slot.
    pub fn add_reference(&mut self, name: &str) -> Result<u64, HeapError> {
        let word = self.platform.word_size();
        self.reserve(name, SlotKind::Reference, word, word)
    }

    /// Embed `ty` inline under `name`.
    pub fn add_inline(&mut self, name: &str, ty: Arc<UnboxedType>) -> Result<u64, HeapError> {
        if ty.platform() != self.platform {
            return Err(HeapError::PlatformMismatch {
                slot: name.to_string(),
                expected: self.platform.word_size(),
                found: ty.platform().word_size(),
            });
        }
        let offset = self.place_inline(name, &*ty)?;
        if let Some(slot) = self.slots.get_mut(name) {
            slot.kind = SlotKind::Inline(ty);
        }
        Ok(offset)
    }

    /// Builder-style [`add_reference`](Self::add_reference).
    pub fn reference(mut self, name: &str) -> Result<Self, HeapError> {
        self.add_reference(name)?;
        Ok(self)
    }

    /// Builder-style [`add_inline`](Self::add_inline).
    pub fn inline(mut self, name: &str, ty: Arc<UnboxedType>) -> Result<Self, HeapError> {
        self.add_inline(name, ty)?;
        Ok(self)
    }

    fn reserve(
        &mut self,
        name: &str,
        kind: SlotKind,
        size: u64,
        align: u64,
    ) -> Result<u64, HeapError> {
        if self.slots.contains_key(name) {
            return Err(HeapError::DuplicateSlot {
                slot: name.to_string(),
            });
        }
        let overflow = || HeapError::LayoutOverflow {
            record: self.name.clone(),
        };
        let offset = align_up(self.cursor, align).ok_or_else(overflow)?;
        let end = offset.checked_add(size).ok_or_else(overflow)?;
        self.cursor = end;
        self.alignment = self.alignment.max(align);
        self.slots.insert(name.to_string(), SlotLayout { kind, offset, size });
        Ok(offset)
    }

    /// Finish the layout, rounding the size up to the record alignment.
    pub fn build(self) -> Result<RecordLayout, HeapError> {
        let size = align_up(self.cursor, self.alignment)
            .filter(|&size| size <= self.platform.max_addressable())
            .ok_or_else(|| HeapError::LayoutOverflow {
                record: self.name.clone(),
            })?;
        let reference_offsets = self
            .slots
            .values()
            .filter(|slot| slot.kind == SlotKind::Reference)
            .map(|slot| slot.offset)
            .collect();
        let opaque_ranges = self
            .slots
            .values()
            .filter(|slot| slot.kind.is_opaque() && slot.size > 0)
            .map(SlotLayout::range)
            .collect();
        let layout = RecordLayout {
            name: self.name,
            platform: self.platform,
            slots: self.slots,
            size,
            alignment: self.alignment,
            reference_offsets,
            opaque_ranges,
        };
        debug!("built record layout {layout}");
        Ok(layout)
    }
}

impl InlinePlacer for RecordLayoutBuilder {
    type Error = HeapError;

    /// Reserve an opaque inline region.
    ///
    /// A layout that is not opaque to scanning is rejected here, while the
    /// record type is still being defined, so no instance of it can ever
    /// reach the scanner.
    fn place_inline(&mut self, name: &str, layout: &dyn InlineLayout) -> Result<u64, HeapError> {
        if !layout.is_opaque_to_scanning() {
            return Err(HeapError::ScannableInline {
                slot: name.to_string(),
            });
        }
        let align = layout.required_alignment().max(1);
        if !align.is_power_of_two() {
            return Err(HeapError::LayoutOverflow {
                record: self.name.clone(),
            });
        }
        self.reserve(name, SlotKind::Opaque, layout.required_byte_size(), align)
    }
}

fn align_up(value: u64, align: u64) -> Option<u64> {
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Final layout of a record type.
///
/// Immutable once built; shared between the heap's objects via `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    name: String,
    platform: Platform,
    slots: IndexMap<String, SlotLayout>,
    size: u64,
    alignment: u64,
    reference_offsets: SmallVec<[u64; 8]>,
    opaque_ranges: Vec<Range<u64>>,
}

impl RecordLayout {
    /// Name of the record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform the record was laid out for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Size of one instance in bytes, including trailing padding.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Alignment of the most-aligned slot.
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Look up a slot by name.
    pub fn slot(&self, name: &str) -> Option<&SlotLayout> {
        self.slots.get(name)
    }

    /// Iterate over `(name, slot)` pairs in placement order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &SlotLayout)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Offsets of every reference slot: the record's scan map.
    pub fn reference_offsets(&self) -> &[u64] {
        &self.reference_offsets
    }

    /// Byte ranges the scanner must never interpret.
    pub fn opaque_ranges(&self) -> &[Range<u64>] {
        &self.opaque_ranges
    }

    /// Whether byte `offset` lies inside an opaque region.
    pub fn is_opaque_at(&self, offset: u64) -> bool {
        self.opaque_ranges.iter().any(|r| r.contains(&offset))
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes, align {}, {} refs, {} opaque)",
            self.name,
            self.size,
            self.alignment,
            self.reference_offsets.len(),
            self.opaque_ranges.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawmem_core::FieldOffsets;
    use rawmem_decl::{compose_type, declare, DeclConfig, DeclaredField, SizeMode};

    fn unboxed(name: &str, fields: &[(SizeMode, i64)], platform: Platform) -> Arc<UnboxedType> {
        let declared = fields
            .iter()
            .enumerate()
            .map(|(i, &(mode, len))| {
                DeclaredField::raw(format!("f{i}"), declare(mode, len, platform).unwrap())
            })
            .collect::<Vec<_>>();
        Arc::new(compose_type(name, declared, &DeclConfig::new(platform)).unwrap())
    }

    struct Scannable;

    impl InlineLayout for Scannable {
        fn required_byte_size(&self) -> u64 {
            8
        }
        fn required_alignment(&self) -> u64 {
            8
        }
        fn field_offsets(&self) -> FieldOffsets {
            FieldOffsets::new()
        }
        fn is_opaque_to_scanning(&self) -> bool {
            false
        }
    }

    #[test]
    fn inline_region_is_aligned_after_reference() {
        let p = Platform::WORD_64;
        let tag = unboxed("Tag", &[(SizeMode::Bytes, 3)], p);
        let pair = unboxed("Pair", &[(SizeMode::Words, 1), (SizeMode::Words, 1)], p);
        let layout = RecordLayoutBuilder::new("Node", p)
            .reference("next")
            .unwrap()
            .inline("tag", tag)
            .unwrap()
            .inline("pair", pair)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(layout.slot("next").unwrap().offset, 0);
        assert_eq!(layout.slot("tag").unwrap().range(), 8..11);
        assert_eq!(layout.slot("pair").unwrap().range(), 16..32);
        assert_eq!(layout.size(), 32);
        assert_eq!(layout.reference_offsets(), &[0]);
        assert_eq!(layout.opaque_ranges(), &[8..11, 16..32]);
    }

    #[test]
    fn size_rounds_up_to_alignment() {
        let p = Platform::WORD_32;
        let layout = RecordLayoutBuilder::new("R", p)
            .reference("r")
            .unwrap()
            .inline("b", unboxed("B", &[(SizeMode::Bytes, 1)], p))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(layout.size(), 8);
        assert_eq!(layout.alignment(), 4);
    }

    #[test]
    fn reference_offsets_never_overlap_opaque_ranges() {
        let p = Platform::WORD_64;
        let layout = RecordLayoutBuilder::new("R", p)
            .inline("a", unboxed("A", &[(SizeMode::Bytes, 5)], p))
            .unwrap()
            .reference("r1")
            .unwrap()
            .inline("b", unboxed("B", &[(SizeMode::Words, 2)], p))
            .unwrap()
            .reference("r2")
            .unwrap()
            .build()
            .unwrap();
        for &offset in layout.reference_offsets() {
            for byte in offset..offset + p.word_size() {
                assert!(!layout.is_opaque_at(byte));
            }
        }
        assert_eq!(layout.reference_offsets(), &[8, 32]);
    }

    #[test]
    fn scannable_inline_is_rejected_at_definition() {
        let mut builder = RecordLayoutBuilder::new("Bad", Platform::WORD_64);
        assert_eq!(
            builder.place_inline("leak", &Scannable),
            Err(HeapError::ScannableInline {
                slot: "leak".into()
            })
        );
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let mut builder = RecordLayoutBuilder::new("Dup", Platform::WORD_64);
        builder.add_reference("x").unwrap();
        assert_eq!(
            builder.add_reference("x"),
            Err(HeapError::DuplicateSlot { slot: "x".into() })
        );
    }

    #[test]
    fn foreign_word_size_is_rejected() {
        let ty = unboxed("W", &[(SizeMode::Words, 1)], Platform::WORD_32);
        let mut builder = RecordLayoutBuilder::new("R", Platform::WORD_64);
        assert!(matches!(
            builder.add_inline("w", ty),
            Err(HeapError::PlatformMismatch {
                expected: 8,
                found: 4,
                ..
            })
        ));
    }

    #[test]
    fn zero_sized_inline_has_no_opaque_range() {
        let p = Platform::WORD_64;
        let layout = RecordLayoutBuilder::new("R", p)
            .inline("marker", unboxed("Marker", &[], p))
            .unwrap()
            .reference("r")
            .unwrap()
            .build()
            .unwrap();
        assert!(layout.opaque_ranges().is_empty());
        assert_eq!(
            layout.slot("marker").unwrap().kind,
            SlotKind::Inline(unboxed("Marker", &[], p))
        );
    }

    #[test]
    fn empty_record_is_zero_sized() {
        let layout = RecordLayoutBuilder::new("Empty", Platform::WORD_64)
            .build()
            .unwrap();
        assert_eq!(layout.size(), 0);
        assert_eq!(layout.alignment(), 1);
    }

    #[test]
    fn oversized_record_overflows_small_address_space() {
        let p = Platform::new(1).unwrap();
        let mut builder = RecordLayoutBuilder::new("Big", p);
        for i in 0..300 {
            builder.add_reference(&format!("r{i}")).unwrap();
        }
        assert!(matches!(
            builder.build(),
            Err(HeapError::LayoutOverflow { .. })
        ));
    }
}
