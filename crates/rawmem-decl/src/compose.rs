//! Composition of raw-storage fields into unboxed types.
//!
//! [`compose_type`] takes the ordered field list supplied by the type-system
//! front-end and produces an [`UnboxedType`]: a flat, padding-free layout
//! in which every field is raw storage or a nested unboxed type. Any field
//! that refers to a heap object rejects the whole type.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};
use rawmem_core::{CompositionViolation, DeclError, FieldOffsets, Platform};

use crate::config::DeclConfig;
use crate::storage::RawStorageSpec;

/// Kind of a field as declared by the front-end, before validation.
#[derive(Clone, Debug)]
pub enum DeclaredKind {
    /// Raw storage of a fixed size.
    Raw(RawStorageSpec),
    /// A nested, previously composed unboxed type.
    Composed(Arc<UnboxedType>),
    /// A reference to a heap object. Never legal in an unboxed type.
    Reference {
        /// Name of the referenced type, for diagnostics.
        referent: String,
    },
}

/// A named field as declared by the front-end.
#[derive(Clone, Debug)]
pub struct DeclaredField {
    /// Field name, unique within its type.
    pub name: String,
    /// What the field holds.
    pub kind: DeclaredKind,
}

impl DeclaredField {
    /// A raw-storage field.
    pub fn raw(name: impl Into<String>, spec: RawStorageSpec) -> Self {
        Self {
            name: name.into(),
            kind: DeclaredKind::Raw(spec),
        }
    }

    /// A field holding a nested unboxed type.
    pub fn composed(name: impl Into<String>, ty: Arc<UnboxedType>) -> Self {
        Self {
            name: name.into(),
            kind: DeclaredKind::Composed(ty),
        }
    }

    /// A heap-reference field.
    pub fn reference(name: impl Into<String>, referent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DeclaredKind::Reference {
                referent: referent.into(),
            },
        }
    }
}

/// Kind of a field inside a composed [`UnboxedType`].
///
/// Only raw storage and nested unboxed types exist here, so a composed
/// type cannot hold a heap reference at any depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw storage of a fixed size.
    Raw(RawStorageSpec),
    /// A nested unboxed type, laid out inline.
    Composed(Arc<UnboxedType>),
}

impl FieldKind {
    /// Size of the field in bytes.
    pub fn byte_size(&self) -> u64 {
        match self {
            Self::Raw(spec) => spec.byte_size(),
            Self::Composed(ty) => ty.byte_size(),
        }
    }

    /// Alignment the field asks of its placement.
    pub fn alignment(&self) -> u64 {
        match self {
            Self::Raw(spec) => spec.alignment(),
            Self::Composed(ty) => ty.alignment(),
        }
    }

    fn platform(&self) -> Platform {
        match self {
            Self::Raw(spec) => spec.platform(),
            Self::Composed(ty) => ty.platform(),
        }
    }
}

/// A field of a composed type with its resolved placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnboxedField {
    kind: FieldKind,
    offset: u64,
    byte_size: u64,
}

impl UnboxedField {
    /// What the field holds.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Byte offset from the start of the enclosing type.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Size of the field in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Whether the field starts at a multiple of its own alignment.
    pub fn is_aligned(&self) -> bool {
        self.offset % self.kind.alignment() == 0
    }
}

/// A validated native-width type built from raw-storage fields.
///
/// Fields are stored in declaration order with offsets assigned by prefix
/// sum; no padding is inserted. The type is immutable once composed.
#[derive(Clone, Debug)]
pub struct UnboxedType {
    name: String,
    platform: Platform,
    fields: IndexMap<String, UnboxedField>,
    byte_size: u64,
    alignment: u64,
}

impl UnboxedType {
    /// Name given to the type at composition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform the type was composed for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Total size in bytes: the sum of all field sizes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Alignment of the most-aligned field, or 1 when there are none.
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&UnboxedField> {
        self.fields.get(name)
    }

    /// Iterate over `(name, field)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &UnboxedField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Byte offset of each field, in declaration order.
    pub fn offsets(&self) -> FieldOffsets {
        self.fields.values().map(|f| f.offset).collect()
    }

    /// Names of fields that start at an offset their alignment does not
    /// divide. Legal, but the enclosing layout cannot fix it.
    pub fn unaligned_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, f)| !f.is_aligned())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl PartialEq for UnboxedType {
    /// Structural equality, including field order.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.platform == other.platform
            && self.byte_size == other.byte_size
            && self.alignment == other.alignment
            && self.fields.iter().eq(other.fields.iter())
    }
}

impl Eq for UnboxedType {}

impl fmt::Display for UnboxedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes, align {}, {} fields)",
            self.name,
            self.byte_size,
            self.alignment,
            self.fields.len()
        )
    }
}

/// Compose an ordered list of fields into an unboxed type.
///
/// Offsets are the running sum of field sizes in declaration order, so two
/// compositions of structurally identical lists always agree on size and
/// offsets. The whole type is rejected with
/// [`DeclError::IllegalComposition`] if any field is a heap reference,
/// repeats a name, was declared for another word size, or pushes the total
/// past [`DeclConfig::type_size_limit`].
pub fn compose_type(
    name: &str,
    fields: impl IntoIterator<Item = DeclaredField>,
    config: &DeclConfig,
) -> Result<UnboxedType, DeclError> {
    let platform = config.platform;
    let limit = config.type_size_limit();
    let fields = fields.into_iter();
    let mut placed: IndexMap<String, UnboxedField> = IndexMap::with_capacity(fields.size_hint().0);
    let mut cursor = 0u64;
    let mut alignment = 1u64;

    for DeclaredField { name: field_name, kind } in fields {
        let kind = match kind {
            DeclaredKind::Raw(spec) => FieldKind::Raw(spec),
            DeclaredKind::Composed(ty) => FieldKind::Composed(ty),
            DeclaredKind::Reference { referent } => {
                return Err(DeclError::illegal(
                    name,
                    CompositionViolation::ReferenceField {
                        field: field_name,
                        referent,
                    },
                ));
            }
        };
        if kind.platform() != platform {
            return Err(DeclError::illegal(
                name,
                CompositionViolation::PlatformMismatch {
                    field: field_name,
                    expected: platform.word_size(),
                    found: kind.platform().word_size(),
                },
            ));
        }
        if placed.contains_key(&field_name) {
            return Err(DeclError::illegal(
                name,
                CompositionViolation::DuplicateField { field: field_name },
            ));
        }

        let byte_size = kind.byte_size();
        let end = cursor
            .checked_add(byte_size)
            .filter(|&end| end <= limit)
            .ok_or_else(|| DeclError::illegal(name, CompositionViolation::SizeOverflow { limit }))?;
        alignment = alignment.max(kind.alignment());
        let field = UnboxedField {
            kind,
            offset: cursor,
            byte_size,
        };
        if !field.is_aligned() {
            warn!(
                "{name}.{field_name} needs {}-byte alignment but sits at offset {cursor}",
                field.kind.alignment()
            );
        }
        placed.insert(field_name, field);
        cursor = end;
    }

    debug!(
        "composed unboxed type {name}: {} fields, {cursor} bytes, align {alignment}",
        placed.len()
    );
    Ok(UnboxedType {
        name: name.to_string(),
        platform,
        fields: placed,
        byte_size: cursor,
        alignment,
    })
}
