//! Raw-storage size specifications.
//!
//! A [`RawStorageSpec`] records how many raw bytes a single field occupies.
//! The size is given in machine words or in bytes and is converted to a
//! byte count exactly once, when the spec is declared.

use std::fmt;
use std::str::FromStr;

use log::debug;
use rawmem_core::{DeclError, Platform, SpecViolation};

/// Unit in which a raw-storage length is expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeMode {
    /// `length` counts platform machine words.
    Words,
    /// `length` counts bytes.
    Bytes,
}

impl SizeMode {
    /// Map the boolean "length in words" form onto a size mode.
    pub fn from_words_flag(length_in_words: bool) -> Self {
        if length_in_words {
            Self::Words
        } else {
            Self::Bytes
        }
    }

    /// Number of bytes in one unit of this mode on `platform`.
    pub fn unit_bytes(self, platform: Platform) -> u64 {
        match self {
            Self::Words => platform.word_size(),
            Self::Bytes => 1,
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Words => write!(f, "words"),
            Self::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for SizeMode {
    type Err = DeclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("words") {
            Ok(Self::Words)
        } else if s.eq_ignore_ascii_case("bytes") {
            Ok(Self::Bytes)
        } else {
            Err(SpecViolation::UnknownMode { tag: s.to_string() }.into())
        }
    }
}

impl TryFrom<u8> for SizeMode {
    type Error = DeclError;

    /// `0` is bytes, `1` is words, matching the boolean flag encoding.
    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Bytes),
            1 => Ok(Self::Words),
            other => Err(SpecViolation::UnknownMode {
                tag: other.to_string(),
            }
            .into()),
        }
    }
}

/// Validated size specification of one raw-storage field.
///
/// Constructed only through [`RawStorageSpec::declare`], which rejects
/// negative lengths and byte counts the platform cannot address. The byte
/// size is computed at declaration and never recomputed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawStorageSpec {
    mode: SizeMode,
    length: u64,
    platform: Platform,
    byte_size: u64,
}

impl RawStorageSpec {
    /// Declare a raw-storage field of `length` units of `mode`.
    pub fn declare(mode: SizeMode, length: i64, platform: Platform) -> Result<Self, DeclError> {
        let length =
            u64::try_from(length).map_err(|_| SpecViolation::NegativeLength { length })?;
        let unit_bytes = mode.unit_bytes(platform);
        let max_bytes = platform.max_addressable();
        // Byte lengths are taken verbatim; only the word product is bounded.
        let byte_size = length
            .checked_mul(unit_bytes)
            .filter(|&bytes| mode == SizeMode::Bytes || bytes <= max_bytes)
            .ok_or(SpecViolation::ExceedsAddressSpace {
                length,
                unit_bytes,
                max_bytes,
            })?;
        debug!("declared raw storage of {length} {mode} ({byte_size} bytes) for {platform}");
        Ok(Self {
            mode,
            length,
            platform,
            byte_size,
        })
    }

    /// Declare `length` machine words.
    pub fn words(length: i64, platform: Platform) -> Result<Self, DeclError> {
        Self::declare(SizeMode::Words, length, platform)
    }

    /// Declare `length` bytes.
    pub fn bytes(length: i64, platform: Platform) -> Result<Self, DeclError> {
        Self::declare(SizeMode::Bytes, length, platform)
    }

    /// The unit `length` is expressed in.
    pub fn mode(&self) -> SizeMode {
        self.mode
    }

    /// The declared length in units of [`mode`](Self::mode).
    pub fn length(&self) -> u64 {
        self.length
    }

    /// The platform this spec was declared for.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Size of the field in bytes, fixed at declaration.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Alignment the field asks of its placement.
    ///
    /// Word-mode storage is word aligned; byte-mode storage is byte
    /// aligned regardless of its length.
    pub fn alignment(&self) -> u64 {
        self.mode.unit_bytes(self.platform)
    }
}

impl fmt::Display for RawStorageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "raw[{} {}]", self.length, self.mode)
    }
}

/// Declare a raw-storage field. See [`RawStorageSpec::declare`].
pub fn declare(mode: SizeMode, length: i64, platform: Platform) -> Result<RawStorageSpec, DeclError> {
    RawStorageSpec::declare(mode, length, platform)
}

/// Byte size of `spec` on `platform`.
///
/// For the platform the spec was declared on this is the stored byte size.
/// For any other platform the word product is recomputed and saturates at
/// `u64::MAX` instead of wrapping.
pub fn byte_size_of(spec: &RawStorageSpec, platform: Platform) -> u64 {
    if platform == spec.platform {
        return spec.byte_size;
    }
    spec.length.saturating_mul(spec.mode.unit_bytes(platform))
}
