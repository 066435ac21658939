//! Record heap: bump-allocated record instances with inline raw storage.
//!
//! [`RecordHeap`] reserves `RecordLayout::size()` bytes per instance, so
//! unboxed types are embedded in their enclosing record rather than
//! allocated on their own. Reference slots store the target's object id as
//! a little-endian word; raw slots are plain bytes the heap never decodes.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use log::trace;
use rawmem_core::Platform;

use crate::config::HeapConfig;
use crate::error::HeapError;
use crate::record::{RecordLayout, SlotKind, SlotLayout};
use crate::segment::SegmentList;

/// Handle to a record instance in a [`RecordHeap`].
///
/// The raw id is what a reference slot stores; zero is reserved for null.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(NonZeroU32);

impl ObjectRef {
    /// The value stored in a reference slot pointing at this object.
    pub fn raw(self) -> u64 {
        u64::from(self.0.get())
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ObjectEntry {
    layout: Arc<RecordLayout>,
    segment: u16,
    offset: u32,
    size: u32,
}

/// Heap of record instances.
pub struct RecordHeap {
    platform: Platform,
    segments: SegmentList,
    objects: Vec<ObjectEntry>,
}

impl RecordHeap {
    /// Create an empty heap for `platform`.
    pub fn new(config: HeapConfig, platform: Platform) -> Result<Self, HeapError> {
        config.validate()?;
        Ok(Self {
            platform,
            segments: SegmentList::new(config.segment_bytes, config.max_segments),
            objects: Vec::new(),
        })
    }

    /// Platform whose word size reference slots use.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Allocate a zeroed instance of `layout`.
    ///
    /// All reference slots start null and all raw storage starts zeroed.
    pub fn alloc(&mut self, layout: &Arc<RecordLayout>) -> Result<ObjectRef, HeapError> {
        if layout.platform() != self.platform {
            return Err(HeapError::PlatformMismatch {
                slot: layout.name().to_string(),
                expected: self.platform.word_size(),
                found: layout.platform().word_size(),
            });
        }
        let too_big = || HeapError::CapacityExceeded {
            requested: layout.size(),
            capacity: u64::from(u32::MAX),
        };
        let size = u32::try_from(layout.size()).map_err(|_| too_big())?;
        let align = u32::try_from(layout.alignment()).map_err(|_| too_big())?;
        let id = u32::try_from(self.objects.len() + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(too_big)?;
        let (segment, offset) = self.segments.alloc(size, align)?;
        self.objects.push(ObjectEntry {
            layout: Arc::clone(layout),
            segment,
            offset,
            size,
        });
        let obj = ObjectRef(id);
        trace!("allocated {obj} of {} at segment {segment} offset {offset}", layout.name());
        Ok(obj)
    }

    fn entry(&self, obj: ObjectRef) -> Result<&ObjectEntry, HeapError> {
        self.objects
            .get(obj.index())
            .ok_or(HeapError::UnknownObject { object: obj.raw() })
    }

    /// Resolve a raw reference-slot value to an object.
    ///
    /// Zero is null. Any other value must name an allocated object.
    pub fn decode(&self, raw: u64) -> Result<Option<ObjectRef>, HeapError> {
        if raw == 0 {
            return Ok(None);
        }
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(ObjectRef)
            .filter(|obj| obj.index() < self.objects.len())
            .map(Some)
            .ok_or(HeapError::DanglingReference { raw })
    }

    /// Layout of an allocated object.
    pub fn layout_of(&self, obj: ObjectRef) -> Result<&Arc<RecordLayout>, HeapError> {
        Ok(&self.entry(obj)?.layout)
    }

    /// All bytes of an object.
    pub fn bytes(&self, obj: ObjectRef) -> Result<&[u8], HeapError> {
        let entry = self.entry(obj)?;
        Ok(self.segments.slice(entry.segment, entry.offset, entry.size))
    }

    fn slot<'a>(layout: &'a RecordLayout, name: &str) -> Result<&'a SlotLayout, HeapError> {
        layout.slot(name).ok_or_else(|| HeapError::UnknownSlot {
            slot: name.to_string(),
        })
    }

    fn raw_slot(&self, obj: ObjectRef, name: &str) -> Result<(u16, u32, u32), HeapError> {
        let entry = self.entry(obj)?;
        let slot = Self::slot(&entry.layout, name)?;
        if !slot.kind.is_opaque() {
            return Err(HeapError::NotRaw {
                slot: name.to_string(),
            });
        }
        // Slot ranges lie within the record, whose size fits in u32.
        Ok((entry.segment, entry.offset + slot.offset as u32, slot.size as u32))
    }

    /// Raw bytes of an inline slot.
    pub fn raw(&self, obj: ObjectRef, slot: &str) -> Result<&[u8], HeapError> {
        let (segment, offset, len) = self.raw_slot(obj, slot)?;
        Ok(self.segments.slice(segment, offset, len))
    }

    /// Mutable raw bytes of an inline slot.
    pub fn raw_mut(&mut self, obj: ObjectRef, slot: &str) -> Result<&mut [u8], HeapError> {
        let (segment, offset, len) = self.raw_slot(obj, slot)?;
        Ok(self.segments.slice_mut(segment, offset, len))
    }

    fn reference_slot(&self, obj: ObjectRef, name: &str) -> Result<(u16, u32), HeapError> {
        let entry = self.entry(obj)?;
        let slot = Self::slot(&entry.layout, name)?;
        if slot.kind != SlotKind::Reference {
            return Err(HeapError::NotReference {
                slot: name.to_string(),
            });
        }
        Ok((entry.segment, entry.offset + slot.offset as u32))
    }

    /// Point the reference slot `slot` of `obj` at `target`, or clear it.
    pub fn set_reference(
        &mut self,
        obj: ObjectRef,
        slot: &str,
        target: Option<ObjectRef>,
    ) -> Result<(), HeapError> {
        let raw = match target {
            Some(target) => {
                self.entry(target)?;
                if target.raw() > self.platform.max_addressable() {
                    return Err(HeapError::ReferenceOverflow {
                        object: target.raw(),
                    });
                }
                target.raw()
            }
            None => 0,
        };
        let (segment, offset) = self.reference_slot(obj, slot)?;
        let word = self.platform.word_size() as usize;
        let bytes = raw.to_le_bytes();
        self.segments
            .slice_mut(segment, offset, word as u32)
            .copy_from_slice(&bytes[..word]);
        Ok(())
    }

    /// The object referenced by slot `slot` of `obj`, if any.
    pub fn reference(&self, obj: ObjectRef, slot: &str) -> Result<Option<ObjectRef>, HeapError> {
        let (segment, offset) = self.reference_slot(obj, slot)?;
        self.decode(self.read_word(segment, offset))
    }

    /// Read the word at byte `offset` of `obj` as a raw slot value.
    pub(crate) fn word_at(&self, obj: ObjectRef, offset: u64) -> Result<u64, HeapError> {
        let entry = self.entry(obj)?;
        Ok(self.read_word(entry.segment, entry.offset + offset as u32))
    }

    fn read_word(&self, segment: u16, offset: u32) -> u64 {
        let word = self.platform.word_size() as usize;
        let mut bytes = [0u8; 8];
        bytes[..word].copy_from_slice(self.segments.slice(segment, offset, word as u32));
        u64::from_le_bytes(bytes)
    }
}
