// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Tunables

//! Tunable constants for the generator task.
//!
//! Every field has a default matching the shipped balance; hosts may override
//! any subset through JSON or a JS object. [`GeneratorConfig::validate`] is
//! run on every externally supplied config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::NODE_COUNT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("zone bands out of order: {0}")]
    Bands(&'static str),
    #[error("{field} must lie in (0, 1], got {value}")]
    Factor { field: &'static str, value: f64 },
    #[error("activation thresholds must start at 0 and never decrease: {0:?}")]
    Activation([f64; NODE_COUNT]),
    #[error("value rail [{floor}, {ceiling}] must sit inside [0, 1]")]
    Rail { floor: f64, ceiling: f64 },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Drift speed at the start of the ramp.
    pub drift_speed: f64,
    /// Drift speed once the ramp has completed.
    pub drift_speed_max: f64,
    /// Seconds until drift reaches `drift_speed_max`.
    pub ramp_time: f64,
    /// Elapsed time at which each node comes online.
    pub activate_at: [f64; NODE_COUNT],
    /// No stability accumulation or failure detection before this.
    pub grace_period: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            drift_speed: 0.06,
            drift_speed_max: 0.25,
            ramp_time: 40.0,
            activate_at: [0.0, 6.0, 14.0],
            grace_period: 4.0,
        }
    }
}

/// Zone boundaries over `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoneBands {
    pub underpower_max: f64,
    pub safe_min: f64,
    pub safe_max: f64,
    pub overload_min: f64,
    /// Per-node band every active dial must sit in for stability to count.
    pub balanced_min: f64,
    pub balanced_max: f64,
}

impl Default for ZoneBands {
    fn default() -> Self {
        Self {
            underpower_max: 0.25,
            safe_min: 0.35,
            safe_max: 0.65,
            overload_min: 0.75,
            balanced_min: 0.25,
            balanced_max: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurgeConfig {
    pub threshold: f64,
    pub hysteresis: f64,
    pub duration: f64,
    /// Upward push per second while surging.
    pub push_rate: f64,
}

impl Default for SurgeConfig {
    fn default() -> Self {
        Self { threshold: 0.35, hysteresis: 0.05, duration: 1.5, push_rate: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StabilityConfig {
    pub goal: f64,
    /// Multiplier applied to stability time on every surge or failure.
    pub penalty_factor: f64,
    /// Fractions of `goal` that emit a milestone when crossed.
    pub milestones: Vec<f64>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self { goal: 20.0, penalty_factor: 0.9, milestones: vec![0.25, 0.5, 0.75] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CooldownConfig {
    pub duration: f64,
    pub recovery_window: f64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { duration: 3.0, recovery_window: 3.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Hit radius as a multiple of the dial radius.
    pub hit_tolerance: f64,
    /// Value change per radian of pointer rotation.
    pub sensitivity: f64,
    pub slider_cue_interval_ms: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 1.3,
            sensitivity: 1.0 / (std::f64::consts::PI * 1.5),
            slider_cue_interval_ms: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub difficulty: DifficultyConfig,
    pub zones: ZoneBands,
    pub surge: SurgeConfig,
    pub stability: StabilityConfig,
    pub cooldown: CooldownConfig,
    pub input: InputConfig,
    pub value_floor: f64,
    pub value_ceiling: f64,
    /// Upper bound on a single frame's dt, in seconds.
    pub max_frame_dt: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyConfig::default(),
            zones: ZoneBands::default(),
            surge: SurgeConfig::default(),
            stability: StabilityConfig::default(),
            cooldown: CooldownConfig::default(),
            input: InputConfig::default(),
            value_floor: 0.02,
            value_ceiling: 0.98,
            max_frame_dt: 0.05,
        }
    }
}

impl GeneratorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.difficulty;
        positive("difficulty.drift_speed_max", d.drift_speed_max)?;
        finite("difficulty.drift_speed", d.drift_speed)?;
        positive("difficulty.ramp_time", d.ramp_time)?;
        finite("difficulty.grace_period", d.grace_period)?;
        if d.activate_at[0] != 0.0
            || d.activate_at.iter().any(|t| !t.is_finite())
            || d.activate_at.windows(2).any(|w| w[1] < w[0])
        {
            return Err(ConfigError::Activation(d.activate_at));
        }

        let z = &self.zones;
        for (field, v) in [
            ("zones.underpower_max", z.underpower_max),
            ("zones.safe_min", z.safe_min),
            ("zones.safe_max", z.safe_max),
            ("zones.overload_min", z.overload_min),
            ("zones.balanced_min", z.balanced_min),
            ("zones.balanced_max", z.balanced_max),
        ] {
            finite(field, v)?;
        }
        if !(0.0 <= z.underpower_max
            && z.underpower_max <= z.safe_min
            && z.safe_min < z.safe_max
            && z.safe_max <= z.overload_min
            && z.overload_min <= 1.0)
        {
            return Err(ConfigError::Bands("underpower <= safe < overload"));
        }
        if !(z.balanced_min <= z.safe_min && z.safe_max <= z.balanced_max) {
            return Err(ConfigError::Bands("balanced band must enclose the safe band"));
        }

        let s = &self.surge;
        finite("surge.threshold", s.threshold)?;
        finite("surge.hysteresis", s.hysteresis)?;
        positive("surge.duration", s.duration)?;
        finite("surge.push_rate", s.push_rate)?;

        positive("stability.goal", self.stability.goal)?;
        factor("stability.penalty_factor", self.stability.penalty_factor)?;
        for &m in &self.stability.milestones {
            factor("stability.milestones", m)?;
        }

        positive("cooldown.duration", self.cooldown.duration)?;
        finite("cooldown.recovery_window", self.cooldown.recovery_window)?;

        positive("input.hit_tolerance", self.input.hit_tolerance)?;
        finite("input.sensitivity", self.input.sensitivity)?;
        finite("input.slider_cue_interval_ms", self.input.slider_cue_interval_ms)?;

        if !(0.0 <= self.value_floor
            && self.value_floor < self.value_ceiling
            && self.value_ceiling <= 1.0)
        {
            return Err(ConfigError::Rail {
                floor: self.value_floor,
                ceiling: self.value_ceiling,
            });
        }
        positive("max_frame_dt", self.max_frame_dt)?;
        Ok(())
    }

    /// Clamp a node value onto the rail.
    pub fn clamp_value(&self, v: f64) -> f64 {
        v.clamp(self.value_floor, self.value_ceiling)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() { Ok(()) } else { Err(ConfigError::NotFinite { field, value }) }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 { Ok(()) } else { Err(ConfigError::NotPositive { field, value }) }
}

fn factor(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Factor { field, value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
