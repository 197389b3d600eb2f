// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Render / Feedback Layer

//! Side-effecting consumers of simulation output: audio cues, the host
//! completion notification, the generator hum and decorative sparks.
//!
//! Nothing here feeds back into the simulation. Sparks draw from their own
//! random stream so effects never change a replay.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::layout::Layout;
use crate::types::{Cue, HumProfile, Point, SimEvent, Spark, TASK_ID};

const BURST_SPARKS: usize = 25;
const COOLDOWN_SPARK_CHANCE: f64 = 0.3;
const OVERLOAD_SPARK_CHANCE: f64 = 0.15;
const SPARK_GRAVITY: f64 = 400.0;

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Fire-and-forget audio. Implementations must swallow their own failures.
pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// Host notification that the task was finished.
pub trait CompletionSink {
    fn task_complete(&mut self, task_id: &str);
}

/// Discards everything. Stands in when audio is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl CueSink for Silent {
    fn play(&mut self, _cue: Cue) {}
}

impl CompletionSink for Silent {
    fn task_complete(&mut self, _task_id: &str) {}
}

/// Buffers cues until the host drains them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CueQueue {
    pending: Vec<Cue>,
}

impl CueQueue {
    pub fn drain(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.pending)
    }
}

impl CueSink for CueQueue {
    fn play(&mut self, cue: Cue) {
        self.pending.push(cue);
    }
}

/// Remembers the first completion and ignores any later one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CompletionLatch {
    task_id: Option<String>,
    calls: u32,
}

impl CompletionLatch {
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl CompletionSink for CompletionLatch {
    fn task_complete(&mut self, task_id: &str) {
        self.calls += 1;
        if self.task_id.is_none() {
            self.task_id = Some(task_id.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Hum
// ---------------------------------------------------------------------------

pub fn hum_profile(aggregate: f64, cooldown_active: bool) -> HumProfile {
    HumProfile {
        frequency: 55.0 + aggregate * 45.0,
        gain: if cooldown_active { 0.08 } else { 0.02 + aggregate * 0.04 },
        filter_cutoff: 120.0 + aggregate * 200.0,
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Feedback {
    sparks: Vec<Spark>,
    rng: ChaCha8Rng,
    notified: bool,
    hum_running: bool,
}

impl Feedback {
    pub fn new(seed: u64) -> Self {
        Self {
            sparks: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            notified: false,
            hum_running: true,
        }
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    /// `None` once the hum has been released.
    pub fn hum(&self, aggregate: f64, cooldown_active: bool) -> Option<HumProfile> {
        self.hum_running.then(|| hum_profile(aggregate, cooldown_active))
    }

    /// Stop the hum; the host should tear its oscillator down.
    pub fn release(&mut self) {
        self.hum_running = false;
    }

    /// Turn simulation events into cues, effects and the host notification.
    pub fn dispatch(
        &mut self,
        events: &[SimEvent],
        layout: &Layout,
        cues: &mut dyn CueSink,
        host: &mut dyn CompletionSink,
    ) {
        for event in events {
            match event {
                SimEvent::NodeActivated { .. } => cues.play(Cue::Phase),
                SimEvent::SurgeTriggered { .. } => cues.play(Cue::Miss),
                SimEvent::StabilityMilestone { .. } => cues.play(Cue::Hit),
                SimEvent::CooldownEntered { .. } => {
                    cues.play(Cue::Miss);
                    let anchor = layout.gauge_anchor();
                    for _ in 0..BURST_SPARKS {
                        self.spawn(anchor);
                    }
                }
                SimEvent::Completed => {
                    if !self.notified {
                        self.notified = true;
                        self.release();
                        info!(task = TASK_ID, "task complete");
                        host.task_complete(TASK_ID);
                    }
                }
                SimEvent::SurgeEnded { .. } | SimEvent::RecoveryStarted { .. } => {}
            }
        }
    }

    /// Advance spark physics, spawning ambient sparks while overloaded or
    /// cooling down.
    pub fn update_effects(
        &mut self,
        dt: f64,
        aggregate: f64,
        cooldown_active: bool,
        layout: &Layout,
        cfg: &GeneratorConfig,
    ) {
        if cooldown_active {
            if self.rng.gen::<f64>() < COOLDOWN_SPARK_CHANCE {
                let x = layout.width * (0.2 + self.rng.gen::<f64>() * 0.6);
                let y = layout.height * (0.5 + self.rng.gen::<f64>() * 0.3);
                self.spawn(Point::new(x, y));
            }
        } else if aggregate > cfg.zones.overload_min && self.rng.gen::<f64>() < OVERLOAD_SPARK_CHANCE {
            self.spawn(layout.gauge_anchor());
        }

        for s in self.sparks.iter_mut() {
            s.x += s.vx * dt;
            s.y += s.vy * dt;
            s.vy += SPARK_GRAVITY * dt;
            s.life -= dt;
        }
        self.sparks.retain(|s| s.life > 0.0);
    }

    fn spawn(&mut self, at: Point) {
        let life = 0.5 + self.rng.gen::<f64>() * 0.8;
        self.sparks.push(Spark {
            x: at.x,
            y: at.y,
            vx: (self.rng.gen::<f64>() - 0.5) * 300.0,
            vy: -100.0 - self.rng.gen::<f64>() * 250.0,
            life,
            max_life: life,
            size: 2.0 + self.rng.gen::<f64>() * 3.0,
        });
    }
}
