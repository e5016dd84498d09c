use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::types::Rgb;

/// Substituted for an exactly-zero distance between two bodies.
pub const DISTANCE_EPSILON: f64 = 1e-8;

pub const COLOR_MIN: u8 = 10;
pub const COLOR_MAX: u8 = 255;
/// Lighter bodies below this mass ratio do not tint the survivor.
pub const COLOR_BLEND_MIN_RATIO: f64 = 0.05;

pub const FRAGMENT_COUNT_MIN_FACTOR: f64 = 5.0;
pub const FRAGMENT_COUNT_MAX_FACTOR: f64 = 20.0;
pub const FRAGMENT_COUNT_MIN: i64 = 3;
pub const FRAGMENT_MIN_WEIGHT_RATIO: f64 = 0.01;
pub const FRAGMENT_SPEED_RATIO: f64 = 0.05;

/// Every explosion ring is stroked in this colour.
pub const EXPLOSION_COLOR: Rgb = Rgb {
    r: 19,
    g: 100,
    b: 99,
};

pub const EXPLOSION_GROWTH_EXP: f64 = 0.8;
pub const EXPLOSION_FADE_EXP: i32 = 4;
pub const EXPLOSION_FADE_THRESHOLD: f64 = 0.01;

pub const COMPACT_MIN_LEN: usize = 10;
pub const COMPACT_DESTROYED_RATIO: f64 = 0.25;

/// Corner spawns fire with probability `1 / trunc(SPAWN_ODDS_MS / fps)`.
pub const SPAWN_ODDS_MS: f64 = 2_000.0;
pub const CORNER_TOP_LEFT_MAX_RATIO: f64 = 0.2;
pub const CORNER_BOTTOM_RIGHT_MAX_RATIO: f64 = 0.3;

pub const SEED_MIN_RATIO: f64 = 0.01;
pub const SEED_MAX_RATIO: f64 = 0.5;
pub const SEED_MARGIN: f64 = 10.0;

pub const CLICK_MIN_RATIO: f64 = 0.1;
pub const CLICK_MAX_RATIO: f64 = 0.5;

pub const MIN_TICK_DELAY_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Immutable simulation constants, built once and passed by reference into
/// every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Pixels per gravitational distance unit.
    pub meter: f64,
    /// Mass per unit of body area, before device scaling.
    pub radius_weight_factor: f64,
    /// Device pixel ratio; scales body radii and the capacity area.
    pub pixel_ratio: f64,
    /// Bodies heavier than this blow up.
    pub max_element_weight: f64,
    /// Per-tick speed ceiling, in pixels.
    pub max_element_speed: f64,
    pub g: f64,
    pub fps: u32,
    /// Hard population ceiling, regardless of area.
    pub max_count_of_elements: usize,
    /// Base opacity for everything drawn.
    pub visibility: f64,
    pub min_radius: f64,
    /// Screen area (in device-independent pixels) granted per element.
    pub area_per_element: f64,
    /// Relative speed, as a fraction of `max_element_speed`, above which
    /// colliding bodies shatter instead of merging.
    pub collision_speed_factor: f64,
    pub rng_seed: Option<u64>,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            meter: 1_000.0,
            radius_weight_factor: 100.0,
            pixel_ratio: 1.0,
            max_element_weight: 200_000.0,
            max_element_speed: 30.0,
            g: 6.67e-11,
            fps: 24,
            max_count_of_elements: 100,
            visibility: 0.4,
            min_radius: 3.0,
            area_per_element: 60_000.0,
            collision_speed_factor: 0.8,
            rng_seed: None,
        }
    }
}

impl WorldParams {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let params: WorldParams = serde_json::from_str(&raw)?;
        params.validate()?;
        info!(path = %path.display(), "loaded world params");
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.meter) {
            return Err(ConfigError::Invalid("meter must be positive and finite"));
        }
        if !positive(self.radius_weight_factor) || !positive(self.pixel_ratio) {
            return Err(ConfigError::Invalid(
                "radius_weight_factor and pixel_ratio must be positive and finite",
            ));
        }
        if !positive(self.max_element_weight) {
            return Err(ConfigError::Invalid(
                "max_element_weight must be positive and finite",
            ));
        }
        if !positive(self.max_element_speed) {
            return Err(ConfigError::Invalid(
                "max_element_speed must be positive and finite",
            ));
        }
        if !self.g.is_finite() || self.g < 0.0 {
            return Err(ConfigError::Invalid("g must be non-negative and finite"));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.visibility) {
            return Err(ConfigError::Invalid("visibility must be within [0, 1]"));
        }
        if !positive(self.min_radius) || !positive(self.area_per_element) {
            return Err(ConfigError::Invalid(
                "min_radius and area_per_element must be positive and finite",
            ));
        }
        if !positive(self.collision_speed_factor) {
            return Err(ConfigError::Invalid(
                "collision_speed_factor must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Mass per unit of area after device scaling.
    pub fn scaled_radius_weight_factor(&self) -> f64 {
        self.radius_weight_factor * self.pixel_ratio
    }

    /// Radius of a disc of the given mass, without the minimum floor.
    pub fn raw_radius(&self, mass: f64) -> f64 {
        (mass.abs() / self.scaled_radius_weight_factor() / std::f64::consts::PI).sqrt()
    }

    pub fn shatter_speed(&self) -> f64 {
        self.max_element_speed * self.collision_speed_factor
    }

    /// Odds denominator for a corner spawn on a given tick.
    pub fn spawn_odds(&self) -> u32 {
        ((SPAWN_ODDS_MS / f64::from(self.fps)) as u32).max(1)
    }
}
