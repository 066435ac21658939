//! Type registry: `UnboxedTypeId` → composed [`UnboxedType`].
//!
//! The [`TypeRegistry`] is filled during single-threaded definition time
//! and then frozen into a [`SharedRegistry`]. After freezing nothing can
//! be added or changed, so layout and scan queries read it from any thread
//! without locking.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use rawmem_core::{DeclError, UnboxedTypeId};
use thiserror::Error;

use crate::compose::{compose_type, DeclaredField, UnboxedType};
use crate::config::DeclConfig;

/// Errors from defining types in a [`TypeRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The type failed declaration or composition.
    #[error(transparent)]
    Decl(#[from] DeclError),
    /// A type with this name is already defined.
    #[error("type '{name}' is already defined")]
    DuplicateType {
        /// The repeated name.
        name: String,
    },
    /// A nested type was requested by a name that is not defined.
    #[error("unknown type '{name}'")]
    UnknownType {
        /// The unrecognised name.
        name: String,
    },
    /// The registry has run out of type IDs.
    #[error("type registry is full ({capacity} types)")]
    Full {
        /// Number of types already defined.
        capacity: usize,
    },
}

/// Read-only registry shared after definition time.
pub type SharedRegistry = Arc<TypeRegistry>;

/// Maps type IDs and names to composed unboxed types.
///
/// Uses `IndexMap` for deterministic iteration in definition order, so
/// every consumer that walks the registry sees the same sequence.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    config: DeclConfig,
    types: IndexMap<UnboxedTypeId, Arc<UnboxedType>>,
    names: IndexMap<String, UnboxedTypeId>,
}

impl TypeRegistry {
    /// Create an empty registry for the given configuration.
    pub fn new(config: DeclConfig) -> Self {
        Self {
            config,
            types: IndexMap::new(),
            names: IndexMap::new(),
        }
    }

    /// The configuration every type in this registry is composed under.
    pub fn config(&self) -> &DeclConfig {
        &self.config
    }

    /// Compose and register a named type.
    ///
    /// On any failure nothing is registered.
    pub fn define(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = DeclaredField>,
    ) -> Result<UnboxedTypeId, RegistryError> {
        if self.names.contains_key(name) {
            return Err(RegistryError::DuplicateType {
                name: name.to_string(),
            });
        }
        let id = u32::try_from(self.types.len())
            .map(UnboxedTypeId)
            .map_err(|_| RegistryError::Full {
                capacity: self.types.len(),
            })?;
        let ty = compose_type(name, fields, &self.config)?;
        debug!("defined unboxed type {id}: {ty}");
        self.types.insert(id, Arc::new(ty));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// A field embedding the already-defined type `type_name`.
    pub fn composed_field(
        &self,
        field_name: &str,
        type_name: &str,
    ) -> Result<DeclaredField, RegistryError> {
        let ty = self
            .by_name(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                name: type_name.to_string(),
            })?;
        Ok(DeclaredField::composed(field_name, Arc::clone(ty)))
    }

    /// Look up a type by ID.
    pub fn get(&self, id: UnboxedTypeId) -> Option<&Arc<UnboxedType>> {
        self.types.get(&id)
    }

    /// Look up a type by name.
    pub fn by_name(&self, name: &str) -> Option<&Arc<UnboxedType>> {
        self.names.get(name).and_then(|id| self.types.get(id))
    }

    /// The ID assigned to `name`, if defined.
    pub fn id_of(&self, name: &str) -> Option<UnboxedTypeId> {
        self.names.get(name).copied()
    }

    /// Iterate over all types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (UnboxedTypeId, &Arc<UnboxedType>)> {
        self.types.iter().map(|(id, ty)| (*id, ty))
    }

    /// Number of defined types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are defined.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// End definition time and share the registry read-only.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use rawmem_core::{CompositionViolation, Platform, SpecViolation};

    use super::*;
    use crate::storage::{declare, SizeMode};

    fn registry() -> TypeRegistry {
        TypeRegistry::new(DeclConfig::new(Platform::WORD_64))
    }

    fn word(name: &str) -> DeclaredField {
        DeclaredField::raw(name, declare(SizeMode::Words, 1, Platform::WORD_64).unwrap())
    }

    #[test]
    fn define_assigns_sequential_ids() {
        let mut reg = registry();
        let a = reg.define("A", vec![word("v")]).unwrap();
        let b = reg.define("B", vec![word("v")]).unwrap();
        assert_eq!(a, UnboxedTypeId(0));
        assert_eq!(b, UnboxedTypeId(1));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.id_of("B"), Some(b));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = registry();
        reg.define("A", vec![word("v")]).unwrap();
        assert_eq!(
            reg.define("A", vec![word("w")]),
            Err(RegistryError::DuplicateType { name: "A".into() })
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn failed_composition_registers_nothing() {
        let mut reg = registry();
        let err = reg
            .define("Bad", vec![word("v"), DeclaredField::reference("r", "Object")])
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Decl(DeclError::IllegalComposition {
                violation: CompositionViolation::ReferenceField { .. },
                ..
            })
        ));
        assert!(reg.is_empty());
        assert!(reg.by_name("Bad").is_none());
    }

    #[test]
    fn composed_field_resolves_by_name() {
        let mut reg = registry();
        reg.define("Word", vec![word("value")]).unwrap();
        let lo = reg.composed_field("lo", "Word").unwrap();
        let hi = reg.composed_field("hi", "Word").unwrap();
        let pair = reg.define("Pair", vec![lo, hi]).unwrap();
        assert_eq!(reg.get(pair).unwrap().byte_size(), 16);
        assert_eq!(
            reg.composed_field("x", "Missing").unwrap_err(),
            RegistryError::UnknownType {
                name: "Missing".into()
            }
        );
    }

    #[test]
    fn iteration_follows_definition_order() {
        let mut reg = registry();
        for name in ["C", "A", "B"] {
            reg.define(name, vec![word("v")]).unwrap();
        }
        let names: Vec<&str> = reg.iter().map(|(_, ty)| ty.name()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn shared_registry_is_readable_across_threads() {
        let mut reg = registry();
        let id = reg.define("Word", vec![word("value")]).unwrap();
        let shared = reg.into_shared();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.get(id).map(|ty| ty.byte_size()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(8));
        }
    }

    #[test]
    fn decl_errors_pass_through() {
        let err: RegistryError =
            DeclError::InvalidSpec(SpecViolation::NegativeLength { length: -1 }).into();
        assert_eq!(err.to_string(), "invalid raw storage spec: length -1 is negative");
    }
}
