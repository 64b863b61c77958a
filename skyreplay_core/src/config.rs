//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from building or reading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A threshold or factor is out of its valid range
    #[error("Invalid config: {field} = {value} ({reason})")]
    Invalid {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Thresholds and factors shared by every analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Uniform factor applied to every raw coordinate (default: 0.01)
    pub scale_factor: f64,

    /// Half the minimum allowed separation between two drones (default: 1.0)
    pub collision_radius: f64,

    /// Safe maximum speed in scaled units per second (default: 5.0)
    pub max_speed: f64,

    /// Bound on each event log; `None` keeps every event (default: None)
    pub log_capacity: Option<usize>,

    /// Forget speed baselines on seek so a scrub jump is not a speed spike
    /// (default: false)
    pub rebaseline_on_seek: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.01,
            collision_radius: 1.0,
            max_speed: 5.0,
            log_capacity: None,
            rebaseline_on_seek: false,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_scale_factor(mut self, scale: f64) -> Self {
        self.scale_factor = scale;
        self
    }

    pub fn with_collision_radius(mut self, radius: f64) -> Self {
        self.collision_radius = radius;
        self
    }

    pub fn with_max_speed(mut self, speed: f64) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_rebaseline_on_seek(mut self, rebaseline: bool) -> Self {
        self.rebaseline_on_seek = rebaseline;
        self
    }

    pub fn with_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Minimum separation: two drones closer than this collide.
    pub fn collision_distance(&self) -> f64 {
        2.0 * self.collision_radius
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(ConfigError::Invalid {
                field: "scale_factor",
                value: self.scale_factor,
                reason: "must be finite and positive",
            });
        }
        if !(self.collision_radius.is_finite() && self.collision_radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "collision_radius",
                value: self.collision_radius,
                reason: "must be finite and positive",
            });
        }
        if self.max_speed.is_nan() || self.max_speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_speed",
                value: self.max_speed,
                reason: "must not be negative",
            });
        }
        if self.log_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "log_capacity",
                value: 0.0,
                reason: "must be at least 1 when set",
            });
        }
        Ok(())
    }
}
