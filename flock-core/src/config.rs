//! Tunable parameters for both species and the world.
//!
//! Every block deserializes from PascalCase JSON keys (`MinSpeed`,
//! `PerceptionRadius`, ...) and fills missing keys from its `Default`.
//! [`FlockConfig::load_or_default`] is the one place that swallows loader
//! errors; everything downstream assumes a valid snapshot.

use crate::types::Rect;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors produced while loading or validating a [`FlockConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Prey movement constraints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PreyMovementParams {
    /// Speed floor; prey never come to a full stop.
    pub min_speed: f32,
    /// Coefficient of the quadratic drag `½ · drag_factor · |v|²`.
    pub drag_factor: f32,
    /// Speed kept when drag would otherwise reverse the velocity.
    pub movement_accuracy: f32,
}

impl Default for PreyMovementParams {
    fn default() -> Self {
        Self {
            min_speed: 4.0,
            drag_factor: 0.01,
            movement_accuracy: 0.01,
        }
    }
}

/// Parameters shared by the neighbor-driven behaviors (alignment,
/// separation, cohesion).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FlockingParams {
    pub perception_radius: f32,
    /// Full field-of-view angle in degrees.
    pub perception_angle: f32,
    /// Weight of a neighbor at distance zero.
    pub min_distance_weight: f32,
    /// Weight of a neighbor at `perception_radius`.
    pub max_distance_weight: f32,
    pub desired_magnitude: f32,
    pub max_steering_force: f32,
    pub scale_force: f32,
}

impl Default for FlockingParams {
    fn default() -> Self {
        Self {
            perception_radius: 8.0,
            perception_angle: 270.0,
            min_distance_weight: 1.0,
            max_distance_weight: 0.2,
            desired_magnitude: 10.0,
            max_steering_force: 0.5,
            scale_force: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EscapeParams {
    pub perception_radius: f32,
    pub speed_factor: f32,
    pub max_steering_force: f32,
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            perception_radius: 15.0,
            speed_factor: 15.0,
            max_steering_force: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AttractionParams {
    pub interaction_radius: f32,
    pub orbit_radius: f32,
    pub min_steering_force: f32,
    pub max_steering_force: f32,
}

impl Default for AttractionParams {
    fn default() -> Self {
        Self {
            interaction_radius: 60.0,
            orbit_radius: 10.0,
            min_steering_force: 0.1,
            max_steering_force: 0.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RepulsionParams {
    pub interaction_radius: f32,
    pub speed_factor: f32,
    pub max_steering_force: f32,
}

impl Default for RepulsionParams {
    fn default() -> Self {
        Self {
            interaction_radius: 30.0,
            speed_factor: 25.0,
            max_steering_force: 5.0,
        }
    }
}

/// Every prey tunable, grouped per behavior.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PreyParams {
    pub movement: PreyMovementParams,
    pub alignment: FlockingParams,
    pub separation: FlockingParams,
    pub cohesion: FlockingParams,
    pub escape: EscapeParams,
    pub attraction: AttractionParams,
    pub repulsion: RepulsionParams,
}

impl Default for PreyParams {
    fn default() -> Self {
        Self {
            movement: PreyMovementParams::default(),
            alignment: FlockingParams::default(),
            // Near neighbors dominate: weight falls off with distance.
            separation: FlockingParams {
                perception_radius: 4.0,
                perception_angle: 300.0,
                min_distance_weight: 1.0,
                max_distance_weight: 0.0,
                desired_magnitude: 10.0,
                max_steering_force: 0.8,
                scale_force: 1.5,
            },
            cohesion: FlockingParams {
                min_distance_weight: 0.2,
                max_distance_weight: 1.0,
                max_steering_force: 0.4,
                scale_force: 0.8,
                ..FlockingParams::default()
            },
            escape: EscapeParams::default(),
            attraction: AttractionParams::default(),
            repulsion: RepulsionParams::default(),
        }
    }
}

impl PreyParams {
    /// Largest perception radius among the neighbor-driven behaviors.
    ///
    /// This sizes the neighbor-graph query box.
    pub fn max_perception_radius(&self) -> f32 {
        self.alignment
            .perception_radius
            .max(self.separation.perception_radius)
            .max(self.cohesion.perception_radius)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PredatorMovementParams {
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Default for PredatorMovementParams {
    fn default() -> Self {
        Self {
            min_speed: 6.0,
            max_speed: 12.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WanderParams {
    pub wander_radius: f32,
    pub wander_distance: f32,
    /// Maximum per-frame change of the wander angle, in radians.
    pub variation_range: f32,
    pub max_steering_force: f32,
}

impl Default for WanderParams {
    fn default() -> Self {
        Self {
            wander_radius: 3.0,
            wander_distance: 6.0,
            variation_range: 0.3,
            max_steering_force: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PredatorParams {
    pub movement: PredatorMovementParams,
    pub wander: WanderParams,
}

/// Per-frame behavior snapshot for both species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BehaviorParams {
    pub prey: PreyParams,
    pub predator: PredatorParams,
}

/// World layout and values fixed for the lifetime of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorldConfig {
    pub bounds: Rect,
    pub prey_count: usize,
    pub predator_count: usize,
    pub seed: u64,
    pub quadtree_capacity: usize,
    pub quadtree_min_size: f32,
    /// Neighbor count at which prey intensity saturates to 1.
    pub intensity_saturation: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(Vec2::new(-100.0, -60.0), Vec2::new(100.0, 60.0)),
            prey_count: 800,
            predator_count: 3,
            seed: 0x5EED_F10C,
            quadtree_capacity: 8,
            quadtree_min_size: 2.0,
            intensity_saturation: 12.0,
        }
    }
}

/// Complete configuration snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FlockConfig {
    pub world: WorldConfig,
    pub prey: PreyParams,
    pub predator: PredatorParams,
}

impl FlockConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: FlockConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Loads `path`, falling back to the built-in defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(%err, "falling back to default flock configuration");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.world.bounds.is_valid() {
            return Err(ConfigError::Invalid("world bounds must have a positive area"));
        }
        if self.world.quadtree_capacity == 0 {
            return Err(ConfigError::Invalid("quadtree capacity must be positive"));
        }
        if self.world.quadtree_min_size < 0.0 {
            return Err(ConfigError::Invalid("quadtree min size must not be negative"));
        }
        if self.predator.movement.min_speed > self.predator.movement.max_speed {
            return Err(ConfigError::Invalid("predator min speed exceeds max speed"));
        }
        Ok(())
    }

    /// The part of the configuration that may change between frames.
    pub fn behavior(&self) -> BehaviorParams {
        BehaviorParams {
            prey: self.prey,
            predator: self.predator,
        }
    }
}
