// Scenario Definitions: scripted players driving the real engine
// Each autopilot only touches the dials through pointer_down/move/up

use generator_engine::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ─── Scenario Configuration ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Style {
    /// Never touches the panel.
    Idle,
    /// Brings a dial back to `target` once it has left the safe band for
    /// `reaction` seconds.
    Corrective { reaction: f64, target: f64 },
}

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub style: Style,
    /// Uniform jitter added to each reaction, seconds.
    pub jitter: f64,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "IDLE",
            label: "Idle (no input)",
            style: Style::Idle,
            jitter: 0.0,
        },
        Scenario {
            name: "ATTENTIVE",
            label: "Attentive (0.3s, recentre)",
            style: Style::Corrective { reaction: 0.3, target: 0.5 },
            jitter: 0.2,
        },
        Scenario {
            name: "SLUGGISH",
            label: "Sluggish (1.2s, recentre)",
            style: Style::Corrective { reaction: 1.2, target: 0.5 },
            jitter: 0.6,
        },
        Scenario {
            name: "OVERSTEER",
            label: "Oversteer (0.4s, to 0.68)",
            style: Style::Corrective { reaction: 0.4, target: 0.68 },
            jitter: 0.2,
        },
    ]
}

// ─── Autopilot ──────────────────────────────────────────────────────────────

pub struct Autopilot {
    style: Style,
    jitter: f64,
    rng: ChaCha8Rng,
    out_since: [Option<f64>; NODE_COUNT],
    delay: [f64; NODE_COUNT],
}

impl Autopilot {
    pub fn new(scenario: &Scenario, seed: u64) -> Self {
        let mut pilot = Self {
            style: scenario.style,
            jitter: scenario.jitter,
            // keep the player's stream apart from the engine's noise and sparks
            rng: ChaCha8Rng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            out_since: [None; NODE_COUNT],
            delay: [0.0; NODE_COUNT],
        };
        for i in 0..NODE_COUNT {
            pilot.delay[i] = pilot.next_delay();
        }
        pilot
    }

    fn next_delay(&mut self) -> f64 {
        match self.style {
            Style::Idle => f64::INFINITY,
            Style::Corrective { reaction, .. } => reaction + self.rng.gen::<f64>() * self.jitter,
        }
    }

    /// Look at the panel and correct at most one dial. Returns the dial moved.
    pub fn act<N: NoiseSource>(
        &mut self,
        sim: &mut GeneratorSimulation<N>,
        now_ms: f64,
        cues: &mut dyn CueSink,
    ) -> Option<usize> {
        let Style::Corrective { target, .. } = self.style else {
            return None;
        };
        let elapsed = sim.state().elapsed;
        let (lo, hi) = (sim.config().zones.safe_min, sim.config().zones.safe_max);

        let mut due = None;
        for (i, node) in sim.state().nodes.iter().enumerate() {
            let off = node.active && (node.value < lo || node.value > hi);
            match (off, self.out_since[i]) {
                (false, _) => self.out_since[i] = None,
                (true, None) => self.out_since[i] = Some(elapsed),
                (true, Some(since)) if due.is_none() && elapsed - since >= self.delay[i] => due = Some(i),
                _ => {}
            }
        }
        let node = due?;

        let value = sim.state().nodes[node].value;
        let sensitivity = sim.config().input.sensitivity;
        let layout = sim.layout().clone();
        let center = layout.dial_centers[node];
        let r = layout.dial_radius;

        let grab = Point::new(center.x + r, center.y);
        if sim.pointer_down(grab, cues) != Some(node) {
            return None;
        }
        let angle = ((target - value) / sensitivity).clamp(-3.0, 3.0);
        sim.pointer_move(
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()),
            now_ms,
            cues,
        );
        sim.pointer_up();

        self.out_since[node] = None;
        self.delay[node] = self.next_delay();
        Some(node)
    }
}
