// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Simulation Core

use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::config::{ConfigError, GeneratorConfig};
use crate::cooldown::{self, Cooldown};
use crate::drift;
use crate::feedback::{CompletionSink, CueSink, Feedback};
use crate::input::InputController;
use crate::layout::Layout;
use crate::node::{self, Node};
use crate::noise::{NoiseSource, SeededNoise};
use crate::surge;
use crate::types::*;
use crate::zones::{self, Verdict};

// ─── SimState ────────────────────────────────────────────────────────────────

/// Complete simulation state for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub nodes: [Node; NODE_COUNT],
    /// Task-local monotonic clock, seconds since start. Activation times and
    /// `recovery_until` are both measured on it.
    pub elapsed: f64,
    pub aggregate_output: f64,
    pub stability_time: f64,
    pub cooldown: Cooldown,
    pub recovery_until: f64,
    pub completed: bool,
}

impl SimState {
    pub fn new() -> Self {
        let nodes = node::initial_nodes();
        let aggregate_output = aggregate::aggregate_output(&nodes);
        Self {
            nodes,
            elapsed: 0.0,
            aggregate_output,
            stability_time: 0.0,
            cooldown: Cooldown::default(),
            recovery_until: 0.0,
            completed: false,
        }
    }

    pub fn phase(&self) -> TaskPhase {
        cooldown::phase(self)
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: SimState,
    pub events: Vec<SimEvent>,
}

/// Clamp a host-supplied frame delta into `[0, max_frame_dt]`.
pub fn sanitize_dt(dt: f64, cfg: &GeneratorConfig) -> f64 {
    if dt.is_finite() { dt.clamp(0.0, cfg.max_frame_dt) } else { 0.0 }
}

/// Pure step: `state` in, successor state and events out.
pub fn step(
    state: &SimState,
    cfg: &GeneratorConfig,
    dt: f64,
    noise: &mut impl NoiseSource,
) -> StepOutcome {
    let mut next = state.clone();
    let mut events = Vec::new();
    step_in_place(&mut next, cfg, dt, noise, &mut events);
    StepOutcome { state: next, events }
}

/// In-place form of [`step`].
pub fn step_in_place(
    state: &mut SimState,
    cfg: &GeneratorConfig,
    dt: f64,
    noise: &mut impl NoiseSource,
    events: &mut Vec<SimEvent>,
) {
    if state.completed {
        return;
    }
    let dt = sanitize_dt(dt, cfg);
    state.elapsed += dt;

    // activation runs on the task clock even while values are frozen
    node::activate_due(&mut state.nodes, state.elapsed, cfg, events);

    if state.cooldown.active {
        cooldown::tick(state, dt, cfg, events);
        return;
    }

    drift::advance(&mut state.nodes, state.elapsed, dt, cfg, noise);

    let recovering = cooldown::in_recovery(state);
    surge::update(&mut state.nodes, &mut state.stability_time, dt, recovering, cfg, events);

    state.aggregate_output = aggregate::aggregate_output(&state.nodes);

    let verdict = zones::evaluate(
        &state.nodes,
        state.aggregate_output,
        state.elapsed,
        dt,
        recovering,
        &mut state.stability_time,
        cfg,
        events,
    );
    match verdict {
        Verdict::Completed => {
            state.completed = true;
            events.push(SimEvent::Completed);
        }
        Verdict::Overload => cooldown::enter(state, cfg, events),
        Verdict::Steady => {}
    }
}

// ─── GeneratorSimulation ─────────────────────────────────────────────────────

/// Frame-loop driver: owns state, noise, input, layout and feedback, and
/// hands events to the injected sinks.
#[derive(Debug, Clone)]
pub struct GeneratorSimulation<N: NoiseSource = SeededNoise> {
    pub(crate) cfg: GeneratorConfig,
    pub(crate) state: SimState,
    pub(crate) noise: N,
    pub(crate) input: InputController,
    pub(crate) layout: Layout,
    pub(crate) feedback: Feedback,
    pub(crate) stats: TaskStats,
    pub(crate) last_timestamp_ms: Option<f64>,
    pub(crate) torn_down: bool,
}

impl GeneratorSimulation<SeededNoise> {
    /// Default tuning, seeded noise.
    pub fn new(seed: u64, width: f64, height: f64) -> Self {
        Self::build(GeneratorConfig::default(), SeededNoise::new(seed), seed, width, height)
    }

    pub fn with_config(
        cfg: GeneratorConfig,
        seed: u64,
        width: f64,
        height: f64,
    ) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(cfg, SeededNoise::new(seed), seed, width, height))
    }
}

impl<N: NoiseSource> GeneratorSimulation<N> {
    /// Use a caller-supplied noise source, e.g. `FixedNoise` for replay tests.
    pub fn with_noise(cfg: GeneratorConfig, noise: N, width: f64, height: f64) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(cfg, noise, 0, width, height))
    }

    fn build(cfg: GeneratorConfig, noise: N, seed: u64, width: f64, height: f64) -> Self {
        Self {
            cfg,
            state: SimState::new(),
            noise,
            input: InputController::new(),
            layout: Layout::compute(width, height),
            feedback: Feedback::new(seed),
            stats: TaskStats::default(),
            last_timestamp_ms: None,
            torn_down: false,
        }
    }

    /// Advance from a display-refresh timestamp in milliseconds. The first
    /// call only establishes the baseline.
    pub fn frame(
        &mut self,
        timestamp_ms: f64,
        cues: &mut dyn CueSink,
        host: &mut dyn CompletionSink,
    ) -> FrameResult {
        let dt = match self.last_timestamp_ms {
            Some(last) if timestamp_ms.is_finite() => (timestamp_ms - last) / 1000.0,
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_timestamp_ms = Some(timestamp_ms);
        }
        self.tick(dt, cues, host)
    }

    /// Advance by `dt` seconds (clamped to `max_frame_dt`).
    pub fn tick(
        &mut self,
        dt: f64,
        cues: &mut dyn CueSink,
        host: &mut dyn CompletionSink,
    ) -> FrameResult {
        if self.torn_down || self.state.completed {
            return FrameResult { dt: 0.0, events: Vec::new(), snapshot: self.snapshot() };
        }
        let dt = sanitize_dt(dt, &self.cfg);

        let mut events = Vec::new();
        step_in_place(&mut self.state, &self.cfg, dt, &mut self.noise, &mut events);
        self.stats.frames += 1;
        self.record(&events);

        self.feedback.dispatch(&events, &self.layout, cues, host);
        if !self.state.completed {
            self.feedback.update_effects(
                dt,
                self.state.aggregate_output,
                self.state.cooldown.active,
                &self.layout,
                &self.cfg,
            );
        }

        FrameResult { dt, events, snapshot: self.snapshot() }
    }

    fn record(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::SurgeTriggered { .. } => self.stats.surges += 1,
                SimEvent::CooldownEntered { .. } => self.stats.cooldowns += 1,
                SimEvent::StabilityMilestone { .. } => self.stats.milestones += 1,
                SimEvent::Completed => self.stats.completed_at = Some(self.state.elapsed),
                _ => {}
            }
        }
    }

    // ── Input ───────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, point: Point, cues: &mut dyn CueSink) -> Option<usize> {
        if self.torn_down {
            return None;
        }
        self.input.pointer_down(point, &self.state, &self.layout, &self.cfg, cues)
    }

    pub fn pointer_move(&mut self, point: Point, now_ms: f64, cues: &mut dyn CueSink) -> Option<f64> {
        if self.torn_down {
            return None;
        }
        self.input
            .pointer_move(point, now_ms, &mut self.state, &self.layout, &self.cfg, cues)
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }

    /// Recompute hit-test geometry. An in-progress drag keeps its baseline.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.layout = Layout::compute(width, height);
    }

    /// Halt the attempt and release the hum.
    pub fn destroy(&mut self) {
        self.torn_down = true;
        self.input.pointer_up();
        self.feedback.release();
    }

    // ── Views ───────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> RenderSnapshot {
        let s = &self.state;
        let bands = &self.cfg.zones;
        let dragging = self.input.dragging();
        RenderSnapshot {
            elapsed: s.elapsed,
            phase: s.phase(),
            nodes: s
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let zone = zones::classify(n.value, bands);
                    NodeView {
                        index: i,
                        value: n.value,
                        active: n.active,
                        surging: n.surging,
                        zone,
                        warning: zone.is_warning(),
                        dragging: dragging == Some(i),
                    }
                })
                .collect(),
            aggregate_output: s.aggregate_output,
            aggregate_zone: zones::classify(s.aggregate_output, bands),
            stability_fraction: (s.stability_time / self.cfg.stability.goal).clamp(0.0, 1.0),
            cooldown_seconds: if s.cooldown.active { s.cooldown.remaining.max(0.0).ceil() as u32 } else { 0 },
            cooldown_progress: if s.cooldown.active {
                (s.cooldown.remaining / self.cfg.cooldown.duration).clamp(0.0, 1.0)
            } else {
                0.0
            },
            in_recovery: !s.cooldown.active && cooldown::in_recovery(s),
            layout: self.layout.clone(),
            sparks: self.feedback.sparks().to_vec(),
            hum: if self.torn_down {
                None
            } else {
                self.feedback.hum(s.aggregate_output, s.cooldown.active)
            },
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Mutable access for hosts and tests that script state directly.
    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.cfg
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn dragging(&self) -> Option<usize> {
        self.input.dragging()
    }
}
