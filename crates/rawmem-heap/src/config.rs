//! Heap configuration parameters.

use crate::error::HeapError;

/// Configuration for the record heap.
///
/// Controls segment sizing and capacity limits. Validated at heap
/// construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Size of each heap segment in bytes.
    ///
    /// Default: 1_048_576 (1MB). Must be a power of two and at least 1024.
    pub segment_bytes: u32,

    /// Maximum number of segments the heap may grow to.
    ///
    /// Default: 16, i.e. 16MB of record storage at the default size.
    pub max_segments: u16,
}

impl HeapConfig {
    /// Default segment size: 1MB.
    pub const DEFAULT_SEGMENT_BYTES: u32 = 1 << 20;

    /// Default maximum segment count.
    pub const DEFAULT_MAX_SEGMENTS: u16 = 16;

    /// Smallest accepted segment size.
    pub const MIN_SEGMENT_BYTES: u32 = 1024;

    /// Create a heap config with default values.
    pub fn new() -> Self {
        Self {
            segment_bytes: Self::DEFAULT_SEGMENT_BYTES,
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), HeapError> {
        if self.segment_bytes < Self::MIN_SEGMENT_BYTES || !self.segment_bytes.is_power_of_two() {
            return Err(HeapError::InvalidConfig {
                reason: format!(
                    "segment_bytes ({}) must be a power of two >= {}",
                    self.segment_bytes,
                    Self::MIN_SEGMENT_BYTES
                ),
            });
        }
        if self.max_segments == 0 {
            return Err(HeapError::InvalidConfig {
                reason: "max_segments must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(HeapConfig::default().validate().is_ok());
    }

    #[test]
    fn non_power_of_two_segment_rejected() {
        let config = HeapConfig {
            segment_bytes: 3000,
            ..HeapConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(HeapError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn tiny_segment_rejected() {
        let config = HeapConfig {
            segment_bytes: 512,
            ..HeapConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_segments_rejected() {
        let config = HeapConfig {
            max_segments: 0,
            ..HeapConfig::new()
        };
        assert!(config.validate().is_err());
    }
}
