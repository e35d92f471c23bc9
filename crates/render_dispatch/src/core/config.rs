//! # Dispatch Configuration
//!
//! Every empirically tuned number the depth-key rules use lives here under a
//! name, so it can be adjusted from a config file instead of being rediscovered
//! in the code.
//!
//! ## Key layout
//!
//! True depths and state-derived keys share a single key space of
//! `0..depth_range`. A state-tier entry with texture page `p` is keyed at
//! `(state_key_base - p) * depth_range / state_key_base`, so a larger page sorts
//! nearer and low pages sit at the far end of the range.

use serde::{Serialize, Deserialize};

// Re-export from the config module for compatibility
pub use crate::config::{Config, ConfigError};

/// Largest `reserve` or `limit` a [`CapacityPolicy`] may ask for
pub const MAX_CAPACITY: usize = 1 << 20;

/// Storage policy for the submission buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityPolicy {
    /// Growable buffer, pre-reserved once and reused every frame
    Unbounded {
        /// Entries reserved up front
        reserve: usize,
    },
    /// Hard limit; submissions past the limit are dropped and counted
    Fixed {
        /// Maximum entries per frame
        limit: usize,
    },
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self::Unbounded { reserve: 4000 }
    }
}

/// How the orderer arranges accepted entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStrategy {
    /// Stable comparison sort on the full key, descending
    FullSort,
    /// Quantize keys into `count` buckets and walk them far to near
    Buckets {
        /// Number of buckets across `depth_range`
        count: usize,
    },
}

impl Default for OrderStrategy {
    fn default() -> Self {
        Self::FullSort
    }
}

/// # Dispatcher Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Submission buffer storage policy
    pub capacity: CapacityPolicy,
    /// Ordering strategy
    pub ordering: OrderStrategy,
    /// Span of the key space; bucket quantization maps it onto the bucket count
    pub depth_range: f32,
    /// Number of distinct render-state slots folded into the key space
    pub state_key_base: f32,
    /// Apparent radius in pixels is `radius * perspective_scale / depth`
    pub perspective_scale: f32,
    /// Subtracted from the depth of billboards (particles, effects, projectiles)
    /// so they do not fight coincident ground geometry
    pub billboard_depth_bias: f32,
    /// Units and shadows pull their depth forward by this many radii
    pub unit_depth_bias_radii: f32,
    /// Anchor height added for defences, walls and wall corners
    pub tall_structure_lift: f32,
    /// Anchor height added for decorative features
    pub feature_lift: f32,
    /// Anchor height added for unit shadows
    pub shadow_lift: f32,
    /// Render state shared by effect groups without their own texture page
    pub generic_effect_state: u32,
    /// Render state bound by proximity markers
    ///
    /// Markers order by true depth, so this only feeds state-change accounting.
    pub proximity_state: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            capacity: CapacityPolicy::default(),
            ordering: OrderStrategy::default(),
            depth_range: 32000.0,
            state_key_base: 1000.0,
            perspective_scale: 1024.0,
            billboard_depth_bias: 16.0,
            unit_depth_bias_radii: 2.0,
            tall_structure_lift: 64.0,
            feature_lift: 2.0,
            shadow_lift: 4.0,
            generic_effect_state: 42,
            proximity_state: 40,
        }
    }
}

impl Config for DispatchConfig {}

impl DispatchConfig {
    /// Set the buffer storage policy
    pub fn with_capacity(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the ordering strategy
    pub fn with_ordering(mut self, ordering: OrderStrategy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Set the perspective scale, typically the projector's focal length in pixels
    pub fn with_perspective_scale(mut self, scale: f32) -> Self {
        self.perspective_scale = scale;
        self
    }

    /// Key assigned to a state-tier entry using `state`
    pub fn state_key(&self, state: u32) -> f32 {
        (self.state_key_base - state as f32) * (self.depth_range / self.state_key_base)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.depth_range > 0.0) {
            return Err(ConfigError::Invalid("depth_range must be positive".to_string()));
        }
        if !(self.state_key_base >= 1.0) {
            return Err(ConfigError::Invalid("state_key_base must be at least 1".to_string()));
        }
        if !(self.perspective_scale > 0.0) {
            return Err(ConfigError::Invalid("perspective_scale must be positive".to_string()));
        }
        if let OrderStrategy::Buckets { count: 0 } = self.ordering {
            return Err(ConfigError::Invalid("bucket count must be at least 1".to_string()));
        }
        match self.capacity {
            CapacityPolicy::Fixed { limit: 0 } => {
                return Err(ConfigError::Invalid("fixed capacity must be at least 1".to_string()));
            }
            CapacityPolicy::Fixed { limit: n } | CapacityPolicy::Unbounded { reserve: n } if n > MAX_CAPACITY => {
                return Err(ConfigError::Invalid(format!("capacity {} exceeds the maximum of {}", n, MAX_CAPACITY)));
            }
            _ => {}
        }
        Ok(())
    }
}
