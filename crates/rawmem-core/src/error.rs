//! Error types for raw-storage declaration and composition.
//!
//! Both declaration error kinds are definition-time failures: a type is
//! either fully valid or rejected in its entirety, never partially built.

use thiserror::Error;

/// Errors from declaring a raw-storage field or composing an unboxed type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeclError {
    /// A single field's size specification is malformed.
    #[error("invalid raw storage spec: {0}")]
    InvalidSpec(SpecViolation),
    /// A composed type includes a field that may not appear in raw storage.
    #[error("illegal composition of '{type_name}': {violation}")]
    IllegalComposition {
        /// Name of the type being composed.
        type_name: String,
        /// What made the composition illegal.
        violation: CompositionViolation,
    },
}

impl DeclError {
    /// Shorthand for an [`DeclError::IllegalComposition`].
    pub fn illegal(type_name: impl Into<String>, violation: CompositionViolation) -> Self {
        Self::IllegalComposition {
            type_name: type_name.into(),
            violation,
        }
    }
}

impl From<SpecViolation> for DeclError {
    fn from(v: SpecViolation) -> Self {
        Self::InvalidSpec(v)
    }
}

/// Why a raw-storage size specification was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpecViolation {
    /// The declared length is negative.
    #[error("length {length} is negative")]
    NegativeLength {
        /// The rejected length.
        length: i64,
    },
    /// A word-mode byte size does not fit in the platform's addressable range.
    #[error("{length} x {unit_bytes} bytes exceeds the addressable range of {max_bytes} bytes")]
    ExceedsAddressSpace {
        /// The declared length.
        length: u64,
        /// Bytes per unit of `length` (the word size, or 1).
        unit_bytes: u64,
        /// Largest representable byte count on the platform.
        max_bytes: u64,
    },
    /// The size mode tag is not one of the recognised modes.
    #[error("unknown size mode '{tag}'")]
    UnknownMode {
        /// The unrecognised tag.
        tag: String,
    },
}

/// Why a composition of fields was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompositionViolation {
    /// A heap-reference field appears among the fields.
    #[error("field '{field}' is a reference to '{referent}'")]
    ReferenceField {
        /// Name of the offending field.
        field: String,
        /// The type the field refers to.
        referent: String,
    },
    /// Two fields share the same name.
    #[error("duplicate field '{field}'")]
    DuplicateField {
        /// The repeated name.
        field: String,
    },
    /// A nested type was composed for a different word size.
    #[error("field '{field}' was composed for {found}-byte words, expected {expected}")]
    PlatformMismatch {
        /// Name of the offending field.
        field: String,
        /// Word size of the enclosing composition.
        expected: u64,
        /// Word size of the nested type.
        found: u64,
    },
    /// The summed field sizes exceed the permitted limit.
    #[error("total size exceeds {limit} bytes")]
    SizeOverflow {
        /// The limit that was exceeded.
        limit: u64,
    },
}

/// Errors from constructing a [`Platform`](crate::Platform).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The word size is zero, not a power of two, or larger than 8 bytes.
    #[error("invalid word size {word_size}: must be a power of two in 1..=8")]
    InvalidWordSize {
        /// The rejected word size.
        word_size: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_violation_converts_into_invalid_spec() {
        let err: DeclError = SpecViolation::NegativeLength { length: -1 }.into();
        assert_eq!(
            err,
            DeclError::InvalidSpec(SpecViolation::NegativeLength { length: -1 })
        );
        assert_eq!(err.to_string(), "invalid raw storage spec: length -1 is negative");
    }

    #[test]
    fn illegal_composition_names_type_and_field() {
        let err = DeclError::illegal(
            "Pair",
            CompositionViolation::ReferenceField {
                field: "next".into(),
                referent: "Object".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "illegal composition of 'Pair': field 'next' is a reference to 'Object'"
        );
    }
}
