//! Canonical native-width types.
//!
//! The runtime's machine-word primitives are each a single word of raw
//! storage. They are the usual building blocks for larger compositions.

use rawmem_core::UnboxedTypeId;

use crate::compose::DeclaredField;
use crate::registry::{RegistryError, TypeRegistry};
use crate::storage::{RawStorageSpec, SizeMode};

/// IDs of the one-word primitives defined by [`NativeWidthTypes::define`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeWidthTypes {
    /// An untyped machine word.
    pub word: UnboxedTypeId,
    /// A memory address.
    pub address: UnboxedTypeId,
    /// A signed distance between addresses.
    pub offset: UnboxedTypeId,
    /// An unsigned length of a memory range.
    pub extent: UnboxedTypeId,
}

impl NativeWidthTypes {
    /// Names under which the primitives are registered.
    pub const NAMES: [&'static str; 4] = ["Word", "Address", "Offset", "Extent"];

    /// Name of the single raw field each primitive carries.
    pub const VALUE_FIELD: &'static str = "value";

    /// Define `Word`, `Address`, `Offset` and `Extent` in `registry`.
    pub fn define(registry: &mut TypeRegistry) -> Result<Self, RegistryError> {
        let platform = registry.config().platform;
        let mut ids = [UnboxedTypeId(0); 4];
        for (slot, name) in ids.iter_mut().zip(Self::NAMES) {
            let spec = RawStorageSpec::declare(SizeMode::Words, 1, platform)?;
            *slot = registry.define(name, [DeclaredField::raw(Self::VALUE_FIELD, spec)])?;
        }
        let [word, address, offset, extent] = ids;
        Ok(Self {
            word,
            address,
            offset,
            extent,
        })
    }

    /// All four IDs, in [`NAMES`](Self::NAMES) order.
    pub fn ids(&self) -> [UnboxedTypeId; 4] {
        [self.word, self.address, self.offset, self.extent]
    }
}
