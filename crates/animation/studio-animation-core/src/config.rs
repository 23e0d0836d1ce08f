//! Core configuration for studio-animation-core.

use serde::{Deserialize, Serialize};

/// Default base-sequence transition ramp, in seconds.
pub const DEFAULT_BLEND_TIME: f32 = 0.2;

/// Configuration for instance sizing and blend behavior.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Fixed size of the concurrent animation-layer pool.
    pub max_layers: usize,

    /// Seconds over which a base-sequence switch ramps the new pose in.
    pub blend_time: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_layers: 8,
            blend_time: DEFAULT_BLEND_TIME,
        }
    }
}
