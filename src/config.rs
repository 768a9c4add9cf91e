//! Tunnel and simulation configuration.
//!
//! Both structs deserialize from camelCase JSON with every field optional;
//! missing fields take their defaults. Values are checked by `validate()`
//! when a configuration is applied, never during a rebuild.

use serde::{Deserialize, Serialize};

use crate::geom::{BBox, DegenerateFramePolicy, Point3, TunnelOptions, Vec3};
use crate::rebuild::InsufficientPathPolicy;

pub const MIN_SIDES: usize = 3;
pub const MAX_SIDES: usize = 32;
pub const DEFAULT_SIDES: usize = 8;
pub const DEFAULT_RADIUS: f64 = 5.0;
pub const MAX_SEGMENTS_PER_UNIT_LENGTH: f64 = 10.0;
pub const DEFAULT_SEGMENTS_PER_UNIT_LENGTH: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sides must be in [{MIN_SIDES}, {MAX_SIDES}], got {sides}")]
    SidesOutOfRange { sides: usize },
    #[error("radius must be finite and > 0, got {radius}")]
    InvalidRadius { radius: f64 },
    #[error("segmentsPerUnitLength must be in (0, {MAX_SEGMENTS_PER_UNIT_LENGTH}], got {value}")]
    DensityOutOfRange { value: f64 },
    #[error("{field} must be finite and >= 0, got {value}")]
    InvalidSimulationValue { field: &'static str, value: f64 },
    #[error("maxKnots must be at least 2, got {max_knots}")]
    TooFewKnots { max_knots: usize },
    #[error("could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shape and failure policies of a procedural tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TunnelConfig {
    /// Vertices per ring, in `[3, 32]`.
    pub sides: usize,
    pub radius: f64,
    /// Ring density along the path, in `(0, 10]`.
    pub segments_per_unit_length: f64,
    pub degenerate_frames: DegenerateFramePolicy,
    pub insufficient_path: InsufficientPathPolicy,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            sides: DEFAULT_SIDES,
            radius: DEFAULT_RADIUS,
            segments_per_unit_length: DEFAULT_SEGMENTS_PER_UNIT_LENGTH,
            degenerate_frames: DegenerateFramePolicy::default(),
            insufficient_path: InsufficientPathPolicy::default(),
        }
    }
}

impl TunnelConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SIDES..=MAX_SIDES).contains(&self.sides) {
            return Err(ConfigError::SidesOutOfRange { sides: self.sides });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius { radius: self.radius });
        }
        let density = self.segments_per_unit_length;
        if !density.is_finite() || density <= 0.0 || density > MAX_SEGMENTS_PER_UNIT_LENGTH {
            return Err(ConfigError::DensityOutOfRange { value: density });
        }
        Ok(())
    }

    #[must_use]
    pub fn options(&self) -> TunnelOptions {
        TunnelOptions {
            sides: self.sides,
            radius: self.radius,
        }
    }

    #[must_use]
    pub fn with_sides(mut self, sides: usize) -> Self {
        self.sides = sides;
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_segments_per_unit_length(mut self, density: f64) -> Self {
        self.segments_per_unit_length = density;
        self
    }

    #[must_use]
    pub fn with_degenerate_frames(mut self, policy: DegenerateFramePolicy) -> Self {
        self.degenerate_frames = policy;
        self
    }

    #[must_use]
    pub fn with_insufficient_path(mut self, policy: InsufficientPathPolicy) -> Self {
        self.insufficient_path = policy;
        self
    }
}

/// Axis-aligned box in config form (`center` + `size`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsConfig {
    pub center: [f64; 3],
    pub size: [f64; 3],
}

impl BoundsConfig {
    #[must_use]
    pub fn to_bbox(self) -> BBox {
        BBox::from_center_size(Point3::from(self.center), Vec3::from(self.size))
    }
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            size: [100.0, 100.0, 100.0],
        }
    }
}

/// Agent, steering and trail settings for a [`TunnelSimulation`](crate::simulation::TunnelSimulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub move_speed: f64,
    /// Maximum wander turn rate, degrees per second.
    pub wander_turn_strength: f64,
    pub wander_noise_frequency: f64,
    pub bounds: BoundsConfig,
    pub boundary_turn_strength: f64,
    pub max_knots: usize,
    pub segment_length: f64,
    pub seed: u64,
    pub tunnel: TunnelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            wander_turn_strength: 45.0,
            wander_noise_frequency: 0.1,
            bounds: BoundsConfig::default(),
            boundary_turn_strength: 2.0,
            max_knots: 50,
            segment_length: 2.0,
            seed: 0,
            tunnel: TunnelConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("moveSpeed", self.move_speed),
            ("wanderTurnStrength", self.wander_turn_strength),
            ("wanderNoiseFrequency", self.wander_noise_frequency),
            ("boundaryTurnStrength", self.boundary_turn_strength),
            ("segmentLength", self.segment_length),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSimulationValue { field, value });
            }
        }
        for value in self.bounds.center.into_iter().chain(self.bounds.size) {
            if !value.is_finite() {
                return Err(ConfigError::InvalidSimulationValue { field: "bounds", value });
            }
        }
        if self.max_knots < 2 {
            return Err(ConfigError::TooFewKnots {
                max_knots: self.max_knots,
            });
        }
        self.tunnel.validate()
    }
}
