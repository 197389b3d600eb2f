// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Type Definitions

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Number of dials on the generator panel.
pub const NODE_COUNT: usize = 3;

/// Host-facing identifier reported on completion.
pub const TASK_ID: &str = "generator-power";

// ─── Cue ─────────────────────────────────────────────────────────────────────

/// Named audio cues understood by the host's procedural audio player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Tick,
    Whoosh,
    Hit,
    Miss,
    Success,
    Slider,
    Phase,
    Align,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Whoosh => "whoosh",
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Success => "success",
            Self::Slider => "slider",
            Self::Phase => "phase",
            Self::Align => "align",
        }
    }
}

// ─── Zone ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Underpower,
    LowWarn,
    Safe,
    HighWarn,
    Overload,
}

impl Zone {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::LowWarn | Self::HighWarn)
    }
}

// ─── Task Phase ──────────────────────────────────────────────────────────────

/// Observable phase of the task, derived from the cooldown timer, the
/// recovery deadline and the completion flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Running,
    Cooldown,
    Recovery,
    Completed,
}

// ─── SimEvent ────────────────────────────────────────────────────────────────

/// Something that happened during a step. Events are emitted in the order
/// they occurred and carry no side effects of their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    NodeActivated { node: usize },
    SurgeTriggered { node: usize },
    SurgeEnded { node: usize },
    StabilityMilestone { fraction: f64 },
    CooldownEntered { stability_time: f64 },
    RecoveryStarted { until: f64 },
    Completed,
}

// ─── Point ───────────────────────────────────────────────────────────────────

/// Pointer position in the simulation's logical surface coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle of `self` seen from `origin`, in radians.
    pub fn angle_from(&self, origin: Point) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }
}

// ─── Spark ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub max_life: f64,
    pub size: f64,
}

// ─── HumProfile ──────────────────────────────────────────────────────────────

/// Target parameters for the host's generator drone oscillator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HumProfile {
    pub frequency: f64,
    pub gain: f64,
    pub filter_cutoff: f64,
}

// ─── NodeView ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub index: usize,
    pub value: f64,
    pub active: bool,
    pub surging: bool,
    pub zone: Zone,
    /// Amber band on either side of safe.
    pub warning: bool,
    pub dragging: bool,
}

// ─── RenderSnapshot ──────────────────────────────────────────────────────────

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub elapsed: f64,
    pub phase: TaskPhase,
    pub nodes: Vec<NodeView>,
    pub aggregate_output: f64,
    pub aggregate_zone: Zone,
    pub stability_fraction: f64,
    pub cooldown_seconds: u32,
    pub cooldown_progress: f64,
    pub in_recovery: bool,
    pub layout: Layout,
    pub sparks: Vec<Spark>,
    pub hum: Option<HumProfile>,
}

// ─── FrameResult ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FrameResult {
    pub dt: f64,
    pub events: Vec<SimEvent>,
    pub snapshot: RenderSnapshot,
}

// ─── TaskStats ───────────────────────────────────────────────────────────────

/// Running counters for one attempt.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskStats {
    pub frames: u64,
    pub surges: u32,
    pub cooldowns: u32,
    pub milestones: u32,
    pub completed_at: Option<f64>,
}
