//! Object scanning that honours scanner-opaque raw storage.
//!
//! [`ObjectScanner`] reads a record only at the offsets in its layout's
//! reference map. Bytes inside inline unboxed regions are never read,
//! never reported to a [`SlotVisitor`], and never followed, whatever
//! values they happen to hold.

use indexmap::IndexSet;
use rawmem_core::SlotVisitor;

use crate::error::HeapError;
use crate::heap::{ObjectRef, RecordHeap};

/// Scans objects in a [`RecordHeap`].
pub struct ObjectScanner<'h> {
    heap: &'h RecordHeap,
}

impl<'h> ObjectScanner<'h> {
    /// Create a scanner over `heap`.
    pub fn new(heap: &'h RecordHeap) -> Self {
        Self { heap }
    }

    /// Report every reference slot of `obj` to `visitor`.
    ///
    /// Returns the number of slots visited.
    pub fn scan_object(
        &self,
        obj: ObjectRef,
        visitor: &mut dyn SlotVisitor,
    ) -> Result<usize, HeapError> {
        let layout = self.heap.layout_of(obj)?;
        for &offset in layout.reference_offsets() {
            debug_assert!(!layout.is_opaque_at(offset));
            visitor.visit_reference(offset, self.heap.word_at(obj, offset)?);
        }
        Ok(layout.reference_offsets().len())
    }

    /// Every object reachable from `roots`, in discovery order.
    ///
    /// Fails with [`HeapError::DanglingReference`] if a reference slot
    /// holds a value that names no object.
    pub fn trace(&self, roots: &[ObjectRef]) -> Result<IndexSet<ObjectRef>, HeapError> {
        let mut reached: IndexSet<ObjectRef> = IndexSet::new();
        let mut worklist: Vec<ObjectRef> = Vec::new();
        for &root in roots {
            self.heap.layout_of(root)?;
            if reached.insert(root) {
                worklist.push(root);
            }
        }

        let mut raw_values = Vec::new();
        while let Some(obj) = worklist.pop() {
            raw_values.clear();
            let mut collect = |_offset: u64, raw: u64| raw_values.push(raw);
            self.scan_object(obj, &mut collect)?;
            for &raw in &raw_values {
                if let Some(target) = self.heap.decode(raw)? {
                    if reached.insert(target) {
                        worklist.push(target);
                    }
                }
            }
        }
        Ok(reached)
    }
}
