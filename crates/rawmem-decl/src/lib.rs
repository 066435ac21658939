//! Raw-storage declaration and unboxed type composition.
//!
//! A raw-storage field is a fixed-size chunk of bytes embedded inline in an
//! enclosing type. Several such fields compose into a larger native-width
//! [`UnboxedType`] whose bytes the collector never scans.
//!
//! # Flow
//!
//! ```text
//! front-end (size mode, length) ──► declare() ──► RawStorageSpec
//!                                                    │
//! ordered DeclaredField list ──────► compose_type() ─┴─► UnboxedType
//!                                                          │
//!            allocator ◄── required_byte_size / alignment ─┤
//!            scanner   ◄── is_opaque_to_scanning ──────────┘
//! ```
//!
//! Everything is computed once at definition time. A composed type is
//! immutable afterwards and is shared between threads behind `Arc`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
pub mod contract;
pub mod native;
pub mod registry;
pub mod storage;

// Public re-exports for the primary API surface.
pub use compose::{compose_type, DeclaredField, DeclaredKind, FieldKind, UnboxedField, UnboxedType};
pub use config::DeclConfig;
pub use contract::{is_opaque_to_scanning, required_alignment, required_byte_size};
pub use native::NativeWidthTypes;
pub use registry::{RegistryError, SharedRegistry, TypeRegistry};
pub use storage::{byte_size_of, declare, RawStorageSpec, SizeMode};
