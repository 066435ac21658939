//! Declaration configuration parameters.

use rawmem_core::Platform;

/// Configuration for declaring and composing unboxed types.
///
/// Fixed for the lifetime of a [`TypeRegistry`](crate::TypeRegistry);
/// every type composed under one config agrees on the word size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclConfig {
    /// Target platform supplying the word size.
    ///
    /// Default: [`Platform::native`].
    pub platform: Platform,

    /// Optional cap on the total byte size of any composed type.
    ///
    /// Default: `None`, meaning only the platform's addressable range
    /// applies. A cap larger than that range has no extra effect.
    pub max_type_bytes: Option<u64>,
}

impl DeclConfig {
    /// Default cap on composed type size.
    pub const DEFAULT_MAX_TYPE_BYTES: Option<u64> = None;

    /// Create a config for the given platform with default limits.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            max_type_bytes: Self::DEFAULT_MAX_TYPE_BYTES,
        }
    }

    /// Set a cap on composed type size.
    pub fn with_max_type_bytes(mut self, max: u64) -> Self {
        self.max_type_bytes = Some(max);
        self
    }

    /// Largest total byte size a composed type may reach.
    pub fn type_size_limit(&self) -> u64 {
        let addressable = self.platform.max_addressable();
        match self.max_type_bytes {
            Some(max) => max.min(addressable),
            None => addressable,
        }
    }
}

impl Default for DeclConfig {
    fn default() -> Self {
        Self::new(Platform::native())
    }
}
