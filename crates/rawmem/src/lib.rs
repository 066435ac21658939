//! rawmem: unboxed raw-storage declarations for a managed heap.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! rawmem sub-crates. For most users, adding `rawmem` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rawmem::prelude::*;
//!
//! let platform = Platform::WORD_64;
//! let config = DeclConfig::new(platform);
//!
//! // Two one-word raw fields, packed back to back.
//! let word = declare(SizeMode::Words, 1, platform).unwrap();
//! let pair = compose_type(
//!     "Pair",
//!     vec![DeclaredField::raw("lo", word), DeclaredField::raw("hi", word)],
//!     &config,
//! )
//! .unwrap();
//! assert_eq!(pair.byte_size(), 16);
//! assert_eq!(pair.offsets().as_slice(), &[0, 8]);
//! assert!(pair.is_opaque_to_scanning());
//!
//! // Embed it in a record next to a reference slot: the scanner sees only
//! // the reference.
//! let layout = std::sync::Arc::new(
//!     RecordLayoutBuilder::new("Node", platform)
//!         .reference("next")
//!         .unwrap()
//!         .inline("payload", std::sync::Arc::new(pair))
//!         .unwrap()
//!         .build()
//!         .unwrap(),
//! );
//! assert_eq!(layout.reference_offsets(), &[0]);
//!
//! let mut heap = RecordHeap::new(HeapConfig::new(), platform).unwrap();
//! let node = heap.alloc(&layout).unwrap();
//! let mut seen = Vec::new();
//! let mut visitor = |offset: u64, _raw: u64| seen.push(offset);
//! ObjectScanner::new(&heap).scan_object(node, &mut visitor).unwrap();
//! assert_eq!(seen, vec![0]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rawmem-core` | Platform, IDs, errors, collaborator traits |
//! | [`decl`] | `rawmem-decl` | Raw storage specs, composition, registry |
//! | [`heap`] | `rawmem-heap` | Record layouts, object heap, scanner |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`rawmem-core`).
///
/// Contains the [`types::Platform`] descriptor, the declaration error
/// taxonomy, and the collaborator traits ([`types::InlineLayout`],
/// [`types::InlinePlacer`], [`types::SlotVisitor`]).
pub use rawmem_core as types;

/// Raw-storage declaration and unboxed type composition (`rawmem-decl`).
///
/// Declare sizes with [`decl::declare`], compose them with
/// [`decl::compose_type`], and keep named types in a
/// [`decl::TypeRegistry`].
pub use rawmem_decl as decl;

/// Record layouts and a scan-honouring object heap (`rawmem-heap`).
pub use rawmem_heap as heap;

/// Common imports for typical rawmem usage.
///
/// ```rust
/// use rawmem::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use rawmem_core::{InlineLayout, InlinePlacer, Platform, SlotVisitor, UnboxedTypeId};

    // Errors
    pub use rawmem_core::{CompositionViolation, DeclError, SpecViolation};
    pub use rawmem_decl::RegistryError;
    pub use rawmem_heap::HeapError;

    // Declaration
    pub use rawmem_decl::{
        compose_type, declare, DeclConfig, DeclaredField, NativeWidthTypes, RawStorageSpec,
        SizeMode, TypeRegistry, UnboxedType,
    };

    // Heap
    pub use rawmem_heap::{
        HeapConfig, ObjectRef, ObjectScanner, RecordHeap, RecordLayout, RecordLayoutBuilder,
    };
}
