// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Node Model

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::types::{SimEvent, NODE_COUNT};

/// Value every node starts at, and returns to on activation or recovery.
pub const CENTER: f64 = 0.5;

/// Initial drift phase per node, so the three dials never move in lockstep.
pub const PHASE_OFFSETS: [f64; NODE_COUNT] = [0.0, 2.1, 4.2];

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub value: f64,
    pub active: bool,
    pub drift_phase: f64,
    pub surging: bool,
    pub surge_remaining: f64,
    /// Hysteresis latch: set when the node may fire a new surge.
    pub surge_armed: bool,
}

impl Node {
    pub fn new(index: usize) -> Self {
        Self {
            value: CENTER,
            active: index == 0,
            drift_phase: PHASE_OFFSETS[index % NODE_COUNT],
            surging: false,
            surge_remaining: 0.0,
            surge_armed: true,
        }
    }

    /// Return to centre with surges cleared and re-armed. Drift phase is kept.
    pub fn recenter(&mut self) {
        self.value = CENTER;
        self.surging = false;
        self.surge_remaining = 0.0;
        self.surge_armed = true;
    }
}

pub fn initial_nodes() -> [Node; NODE_COUNT] {
    [Node::new(0), Node::new(1), Node::new(2)]
}

// ─── Activation ──────────────────────────────────────────────────────────────

/// Bring online every node whose activation time has passed. One-shot per
/// node; there is no way back to inactive.
pub fn activate_due(
    nodes: &mut [Node; NODE_COUNT],
    elapsed: f64,
    cfg: &GeneratorConfig,
    events: &mut Vec<SimEvent>,
) {
    for (i, node) in nodes.iter_mut().enumerate() {
        if node.active || elapsed < cfg.difficulty.activate_at[i] {
            continue;
        }
        node.active = true;
        node.value = CENTER;
        debug!(node = i, elapsed, "node activated");
        events.push(SimEvent::NodeActivated { node: i });
    }
}
