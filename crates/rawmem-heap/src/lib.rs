//! Record layout, inline allocation and scanning for rawmem.
//!
//! These are the collaborators on the far side of the layout/scan
//! contract. They embed unboxed types inline in enclosing records and
//! make sure the collector's scanner never looks inside them.
//!
//! # Architecture
//!
//! ```text
//! RecordLayoutBuilder (InlinePlacer)
//! └── RecordLayout: reference slots + opaque inline regions
//!
//! RecordHeap
//! ├── SegmentList → Segment[] (bump-allocated Vec<u8>)
//! └── ObjectRef → (RecordLayout, segment, offset)
//!
//! ObjectScanner
//! └── visits reference slots only; opaque regions are never read
//! ```
//!
//! All memory is zero-initialised `Vec<u8>`; there is no `unsafe`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod heap;
pub mod record;
pub mod scan;
pub mod segment;

// Public re-exports for the primary API surface.
pub use config::HeapConfig;
pub use error::HeapError;
pub use heap::{ObjectRef, RecordHeap};
pub use record::{RecordLayout, RecordLayoutBuilder, SlotKind, SlotLayout};
pub use scan::ObjectScanner;
