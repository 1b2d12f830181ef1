use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::probe::MAX_CAPACITY;

/// Default starting capacity; already a probe capacity.
pub const DEFAULT_INITIAL_CAPACITY: usize = 11;

/// Tuning knobs for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Requested starting capacity; rounded up to a probe capacity.
    pub initial_capacity: usize,
    /// Grow once `len / capacity` exceeds this ratio.
    pub max_load_factor: f64,
    /// Minimum multiplier applied to the capacity on growth.
    pub growth_factor: usize,
    /// When `false`, inserts never grow the table and report
    /// `CapacityExceeded` once it is full.
    pub auto_resize: bool,
    /// Compact once tombstones exceed this share of the capacity.
    pub tombstone_ratio: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: 0.7,
            growth_factor: 2,
            auto_resize: true,
            tombstone_ratio: 0.25,
        }
    }
}

impl RegistryConfig {
    /// A fixed-size configuration: no automatic growth.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            auto_resize: false,
            ..Default::default()
        }
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_CAPACITY {
            return Err(RegistryError::InvalidConfig(format!(
                "initial_capacity must be at most {MAX_CAPACITY}, got {}",
                self.initial_capacity
            )));
        }
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(RegistryError::InvalidConfig(format!(
                "max_load_factor must be in (0, 1), got {}",
                self.max_load_factor
            )));
        }
        if self.growth_factor < 2 {
            return Err(RegistryError::InvalidConfig(format!(
                "growth_factor must be at least 2, got {}",
                self.growth_factor
            )));
        }
        if !(self.tombstone_ratio > 0.0 && self.tombstone_ratio <= 1.0) {
            return Err(RegistryError::InvalidConfig(format!(
                "tombstone_ratio must be in (0, 1], got {}",
                self.tombstone_ratio
            )));
        }
        Ok(())
    }
}
