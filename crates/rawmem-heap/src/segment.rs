//! Contiguous byte segments and growable segment lists.
//!
//! A [`Segment`] is a 1MB (default) contiguous `Vec<u8>` with bump
//! allocation. A [`SegmentList`] is a growable collection of segments that
//! overflow into new segments when the current one is full.
//!
//! Alignment is relative to the start of a segment. Record instances are
//! only ever addressed through offsets, never through typed pointers.

use crate::error::HeapError;

/// A single contiguous byte segment with bump allocation.
///
/// Segments are never freed while the heap lives.
pub struct Segment {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<u8>,
    /// Bump pointer: next free byte.
    cursor: usize,
}

impl Segment {
    /// Create a zero-initialised segment of `capacity` bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            data: vec![0; capacity as usize],
            cursor: 0,
        }
    }

    /// Bump-allocate `len` bytes at a multiple of `align`.
    ///
    /// Returns `Some((offset, &mut [u8]))`, or `None` if the aligned
    /// request does not fit in the remaining capacity. The returned bytes
    /// are zeroed.
    pub fn alloc(&mut self, len: u32, align: u32) -> Option<(u32, &mut [u8])> {
        let start = align_up(self.cursor, align as usize)?;
        let end = start.checked_add(len as usize)?;
        if end > self.data.len() {
            return None;
        }
        self.cursor = end;
        let slice = &mut self.data[start..end];
        slice.fill(0);
        Some((start as u32, slice))
    }

    /// Get a shared slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice(&self, offset: u32, len: u32) -> &[u8] {
        let start = offset as usize;
        &self.data[start..start + len as usize]
    }

    /// Get a mutable slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice_mut(&mut self, offset: u32, len: u32) -> &mut [u8] {
        let start = offset as usize;
        &mut self.data[start..start + len as usize]
    }
}

fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// A growable list of [`Segment`]s with overflow-based bump allocation.
///
/// When the current segment is full a new one is appended, up to
/// `max_segments`. Allocations never span segments.
pub struct SegmentList {
    segments: Vec<Segment>,
    segment_bytes: u32,
    max_segments: u16,
    /// Index of the segment currently being filled.
    current: usize,
}

impl SegmentList {
    /// Create a new segment list with one pre-allocated segment.
    pub fn new(segment_bytes: u32, max_segments: u16) -> Self {
        let mut segments = Vec::with_capacity(max_segments as usize);
        segments.push(Segment::new(segment_bytes));
        Self {
            segments,
            segment_bytes,
            max_segments,
            current: 0,
        }
    }

    /// Bump-allocate `len` bytes at a multiple of `align`, growing if needed.
    ///
    /// Returns `Ok((segment_index, offset))`, or
    /// `Err(HeapError::CapacityExceeded)` if the request can never fit in
    /// one segment or `max_segments` would be exceeded.
    pub fn alloc(&mut self, len: u32, align: u32) -> Result<(u16, u32), HeapError> {
        if len > self.segment_bytes || align > self.segment_bytes {
            return Err(HeapError::CapacityExceeded {
                requested: u64::from(len),
                capacity: u64::from(self.segment_bytes),
            });
        }

        if let Some((offset, _slice)) = self.segments[self.current].alloc(len, align) {
            return Ok((self.current as u16, offset));
        }

        // Current segment full: grow.
        if self.segments.len() >= self.max_segments as usize {
            return Err(HeapError::CapacityExceeded {
                requested: u64::from(len),
                capacity: self.total_capacity_bytes(),
            });
        }

        let mut seg = Segment::new(self.segment_bytes);
        // Offset 0 of a fresh segment satisfies any alignment, and
        // len <= segment_bytes was checked above.
        let offset = match seg.alloc(len, align) {
            Some((offset, _slice)) => offset,
            None => {
                return Err(HeapError::CapacityExceeded {
                    requested: u64::from(len),
                    capacity: u64::from(self.segment_bytes),
                })
            }
        };
        self.segments.push(seg);
        self.current = self.segments.len() - 1;
        Ok((self.current as u16, offset))
    }

    /// Get a shared slice from the given segment.
    pub fn slice(&self, segment_index: u16, offset: u32, len: u32) -> &[u8] {
        self.segments[segment_index as usize].slice(offset, len)
    }

    /// Get a mutable slice from the given segment.
    pub fn slice_mut(&mut self, segment_index: u16, offset: u32, len: u32) -> &mut [u8] {
        self.segments[segment_index as usize].slice_mut(offset, len)
    }

    fn total_capacity_bytes(&self) -> u64 {
        self.segments.len() as u64 * u64::from(self.segment_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_alloc_returns_zeroed_bytes() {
        let mut seg = Segment::new(1024);
        let (offset, data) = seg.alloc(10, 1).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn segment_honours_alignment() {
        let mut seg = Segment::new(1024);
        seg.alloc(3, 1).unwrap();
        let (offset, _) = seg.alloc(8, 8).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(seg.alloc(1, 1).unwrap().0, 16);
    }

    #[test]
    fn segment_alloc_fails_when_full() {
        let mut seg = Segment::new(100);
        assert!(seg.alloc(100, 1).is_some());
        assert!(seg.alloc(1, 1).is_none());
    }

    #[test]
    fn alignment_gap_can_exhaust_segment() {
        let mut seg = Segment::new(16);
        seg.alloc(9, 1).unwrap();
        assert!(seg.alloc(8, 8).is_none());
        assert_eq!(seg.alloc(7, 1).unwrap().0, 9);
    }

    #[test]
    fn segment_list_grows_on_overflow() {
        let mut list = SegmentList::new(1024, 4);
        list.alloc(1000, 8).unwrap();
        let (seg_idx, offset) = list.alloc(100, 8).unwrap();
        assert_eq!(seg_idx, 1);
        assert_eq!(offset, 0);
        assert_eq!(list.alloc(10, 1).unwrap(), (1, 100));
    }

    #[test]
    fn segment_list_reports_aligned_offset() {
        let mut list = SegmentList::new(1024, 1);
        list.alloc(5, 1).unwrap();
        assert_eq!(list.alloc(4, 4).unwrap(), (0, 8));
    }

    #[test]
    fn segment_list_capacity_exceeded() {
        let mut list = SegmentList::new(1024, 2);
        list.alloc(1024, 1).unwrap();
        list.alloc(1024, 1).unwrap();
        assert!(matches!(
            list.alloc(1, 1),
            Err(HeapError::CapacityExceeded { capacity: 2048, .. })
        ));
    }

    #[test]
    fn oversized_alloc_returns_error_not_panic() {
        let mut list = SegmentList::new(1024, 4);
        assert!(matches!(
            list.alloc(1025, 1),
            Err(HeapError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn segment_list_slice_roundtrip() {
        let mut list = SegmentList::new(1024, 4);
        let (seg, off) = list.alloc(4, 4).unwrap();
        list.slice_mut(seg, off, 4).copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(list.slice(seg, off, 4), &[1, 2, 3, 4]);
    }
}
