use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::projection::ProjectionError;

/// Tunables for the projection. Every field has a default, so a YAML file
/// only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Hard cap on live particles.
    pub particle_capacity: usize,
    pub particle_lifetime_ms: u64,
    /// How long a picked-up passive takes to reach its picker.
    pub pickup_window_ms: u64,
    /// How long a killed entity takes to sink away.
    pub death_window_ms: u64,
    /// Fraction of its own height a killed entity sinks by.
    pub settle_fraction: f32,
    /// Period of the burning-face flame pass.
    pub flame_interval_ms: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            particle_capacity: 1024,
            particle_lifetime_ms: 750,
            pickup_window_ms: 300,
            death_window_ms: 1000,
            settle_fraction: 0.5,
            flame_interval_ms: 100,
        }
    }
}

impl ProjectionConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ProjectionError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ProjectionError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        let invalid = |reason: &str| Err(ProjectionError::InvalidConfig(reason.to_string()));
        if self.particle_capacity < 2 {
            return invalid("particle_capacity must be at least 2");
        }
        if self.particle_lifetime_ms == 0 {
            return invalid("particle_lifetime_ms must be positive");
        }
        if self.pickup_window_ms == 0 || self.death_window_ms == 0 {
            return invalid("ghost windows must be positive");
        }
        if !(0.0..=1.0).contains(&self.settle_fraction) {
            return invalid("settle_fraction must be within [0, 1]");
        }
        Ok(())
    }

    pub fn particle_lifetime(&self) -> Duration {
        Duration::from_millis(self.particle_lifetime_ms)
    }

    pub fn pickup_window(&self) -> Duration {
        Duration::from_millis(self.pickup_window_ms)
    }

    pub fn death_window(&self) -> Duration {
        Duration::from_millis(self.death_window_ms)
    }

    pub fn flame_interval(&self) -> Duration {
        Duration::from_millis(self.flame_interval_ms)
    }
}
