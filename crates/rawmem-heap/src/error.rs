//! Heap-specific error types.

use thiserror::Error;

/// Errors from record layout, allocation and scanning.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HeapError {
    /// Heap configuration failed validation.
    #[error("invalid heap config: {reason}")]
    InvalidConfig {
        /// Description of the violated invariant.
        reason: String,
    },
    /// Segment pool is full, or the request can never fit in a segment.
    #[error("heap capacity exceeded: requested {requested} bytes, capacity {capacity} bytes")]
    CapacityExceeded {
        /// Number of bytes requested.
        requested: u64,
        /// Capacity that was available.
        capacity: u64,
    },
    /// Two slots in one record share a name.
    #[error("duplicate slot '{slot}'")]
    DuplicateSlot {
        /// The repeated name.
        slot: String,
    },
    /// An inline region that the scanner would have to trace.
    ///
    /// Raised while building the layout, before any instance exists.
    #[error("inline slot '{slot}' is not opaque to scanning")]
    ScannableInline {
        /// The rejected slot.
        slot: String,
    },
    /// An inline type composed for a different word size.
    #[error("slot '{slot}' was composed for {found}-byte words, record uses {expected}")]
    PlatformMismatch {
        /// The offending slot.
        slot: String,
        /// Word size of the record or heap.
        expected: u64,
        /// Word size of the slot's type or the layout.
        found: u64,
    },
    /// The record's size does not fit the platform's address range.
    #[error("layout of '{record}' overflows the address range")]
    LayoutOverflow {
        /// Name of the record.
        record: String,
    },
    /// An `ObjectRef` that this heap never allocated.
    #[error("unknown object {object}")]
    UnknownObject {
        /// Raw id of the object.
        object: u64,
    },
    /// A slot name that the record layout does not contain.
    #[error("unknown slot '{slot}'")]
    UnknownSlot {
        /// The unrecognised name.
        slot: String,
    },
    /// Raw access to a reference slot.
    #[error("slot '{slot}' holds a reference, not raw storage")]
    NotRaw {
        /// The slot that was accessed.
        slot: String,
    },
    /// Reference access to a raw slot.
    #[error("slot '{slot}' is raw storage, not a reference")]
    NotReference {
        /// The slot that was accessed.
        slot: String,
    },
    /// An object id too large to store in one word.
    #[error("object {object} does not fit in a reference slot")]
    ReferenceOverflow {
        /// Raw id of the object.
        object: u64,
    },
    /// A reference slot holds a value that names no object.
    #[error("reference slot holds dangling value {raw}")]
    DanglingReference {
        /// The raw slot contents.
        raw: u64,
    },
}
