//! Core types and traits for rawmem unboxed raw storage.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the declaration model and its collaborators:
//! type IDs, the platform descriptor, error types, and the traits the
//! allocator and the collector's scanner implement.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod platform;
pub mod traits;

pub use error::{CompositionViolation, DeclError, PlatformError, SpecViolation};
pub use id::{FieldOffsets, UnboxedTypeId};
pub use platform::Platform;
pub use traits::{InlineLayout, InlinePlacer, SlotVisitor};
