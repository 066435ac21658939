//! Platform descriptor: the machine word width used as a size unit.

use std::fmt;

use crate::error::PlatformError;

/// Describes the target platform's native machine word.
///
/// The word size is the only platform fact the declaration model needs.
/// It must be a power of two between 1 and 8 bytes so that word alignment
/// is well defined and every addressable byte count fits in a `u64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Platform {
    word_size: u8,
}

impl Platform {
    /// A 32-bit platform (4-byte words).
    pub const WORD_32: Platform = Platform { word_size: 4 };

    /// A 64-bit platform (8-byte words).
    pub const WORD_64: Platform = Platform { word_size: 8 };

    /// Largest supported word size in bytes.
    pub const MAX_WORD_SIZE: u64 = 8;

    /// Create a platform descriptor for the given word size in bytes.
    pub fn new(word_size: u64) -> Result<Self, PlatformError> {
        if word_size == 0 || word_size > Self::MAX_WORD_SIZE || !word_size.is_power_of_two() {
            return Err(PlatformError::InvalidWordSize { word_size });
        }
        Ok(Self {
            word_size: word_size as u8,
        })
    }

    /// The platform this process is running on.
    pub fn native() -> Self {
        Self {
            word_size: std::mem::size_of::<usize>() as u8,
        }
    }

    /// Size of a machine word in bytes.
    pub fn word_size(&self) -> u64 {
        u64::from(self.word_size)
    }

    /// Largest byte count representable in a single machine word.
    ///
    /// `2^(8w) - 1` for a `w`-byte word; `u64::MAX` on 64-bit platforms.
    pub fn max_addressable(&self) -> u64 {
        match self.word_size {
            8 => u64::MAX,
            w => (1u64 << (u32::from(w) * 8)) - 1,
        }
    }

    /// Whether `offset` is a multiple of the word size.
    pub fn is_word_aligned(&self, offset: u64) -> bool {
        offset % self.word_size() == 0
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.word_size() * 8)
    }
}
