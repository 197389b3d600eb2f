// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine

pub mod types;
pub mod config;
pub mod noise;
pub mod node;
pub mod drift;
pub mod surge;
pub mod aggregate;
pub mod zones;
pub mod cooldown;
pub mod layout;
pub mod input;
pub mod feedback;
pub mod simulation;

pub use config::{ConfigError, GeneratorConfig};
pub use feedback::{CompletionLatch, CompletionSink, CueQueue, CueSink, Silent};
pub use layout::Layout;
pub use noise::{FixedNoise, NoiseSource, SeededNoise};
pub use simulation::{sanitize_dt, step, GeneratorSimulation, SimState, StepOutcome};
pub use types::*;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// ─── Host Frame ──────────────────────────────────────────────────────────────

/// One frame as the JS shell sees it: events, snapshot, the cues to play and
/// the task id if completion fired this frame.
#[derive(Debug, Serialize)]
struct HostFrame {
    #[serde(flatten)]
    frame: FrameResult,
    cues: Vec<Cue>,
    completed_task: Option<String>,
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct GeneratorTask {
    sim: GeneratorSimulation,
    cues: CueQueue,
    host: CompletionLatch,
    seed: u64,
}

impl GeneratorTask {
    fn from_sim(sim: GeneratorSimulation, seed: u64) -> Self {
        Self { sim, cues: CueQueue::default(), host: CompletionLatch::default(), seed }
    }
}

#[wasm_bindgen]
impl GeneratorTask {
    /// `seed` is a plain JS number; the engine widens it to 64 bits.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, width: f64, height: f64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let seed = u64::from(seed);
        Self::from_sim(GeneratorSimulation::new(seed, width, height), seed)
    }

    /// Build with tuning overrides. Missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(seed: u32, width: f64, height: f64, config: JsValue) -> Result<GeneratorTask, JsError> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let cfg: GeneratorConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let seed = u64::from(seed);
        let sim = GeneratorSimulation::with_config(cfg, seed, width, height)?;
        Ok(Self::from_sim(sim, seed))
    }

    /// Advance from a `requestAnimationFrame` timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) -> JsValue {
        let before = self.host.calls();
        let frame = self.sim.frame(timestamp_ms, &mut self.cues, &mut self.host);
        let completed_task = (self.host.calls() > before)
            .then(|| self.host.task_id().map(str::to_string))
            .flatten();
        let out = HostFrame { frame, cues: self.cues.drain(), completed_task };
        serde_wasm_bindgen::to_value(&out).unwrap_or(JsValue::NULL)
    }

    /// Returns the grabbed dial index, or -1.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> i32 {
        self.sim
            .pointer_down(Point::new(x, y), &mut self.cues)
            .map_or(-1, |i| i as i32)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) -> Option<f64> {
        self.sim.pointer_move(Point::new(x, y), now_ms, &mut self.cues)
    }

    pub fn pointer_up(&mut self) {
        self.sim.pointer_up();
    }

    /// Cues raised by input handlers since the last drain.
    pub fn take_cues(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.cues.drain()).unwrap_or(JsValue::NULL)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.sim.resize(width, height);
    }

    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.sim.snapshot()).unwrap_or(JsValue::NULL)
    }

    pub fn stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.sim.stats()).unwrap_or(JsValue::NULL)
    }

    pub fn is_completed(&self) -> bool {
        self.sim.is_completed()
    }

    pub fn destroy(&mut self) {
        self.sim.destroy();
        self.cues.drain();
    }

    /// Start a fresh attempt with the same seed, tuning and surface.
    pub fn reset(&mut self) {
        let cfg = self.sim.config().clone();
        let (w, h) = (self.sim.layout().width, self.sim.layout().height);
        // config was validated when this task was built
        if let Ok(sim) = GeneratorSimulation::with_config(cfg, self.seed, w, h) {
            *self = Self::from_sim(sim, self.seed);
        }
    }
}
