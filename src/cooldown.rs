// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Cooldown / Recovery State Machine

//! `Running -> Cooldown -> Recovery -> Running`, with `Completed` absorbing.
//!
//! Recovery is not a flag. It is the window `elapsed < recovery_until`,
//! measured on the same monotonic task clock as node activation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::simulation::SimState;
use crate::surge::penalize;
use crate::types::{SimEvent, TaskPhase};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub active: bool,
    pub remaining: f64,
}

pub fn in_recovery(state: &SimState) -> bool {
    state.elapsed < state.recovery_until
}

pub fn phase(state: &SimState) -> TaskPhase {
    if state.completed {
        TaskPhase::Completed
    } else if state.cooldown.active {
        TaskPhase::Cooldown
    } else if in_recovery(state) {
        TaskPhase::Recovery
    } else {
        TaskPhase::Running
    }
}

/// `Running -> Cooldown`.
pub fn enter(state: &mut SimState, cfg: &GeneratorConfig, events: &mut Vec<SimEvent>) {
    state.cooldown = Cooldown { active: true, remaining: cfg.cooldown.duration };
    state.stability_time = penalize(state.stability_time, cfg);
    info!(
        elapsed = state.elapsed,
        aggregate = state.aggregate_output,
        stability = state.stability_time,
        "overload, entering cooldown"
    );
    events.push(SimEvent::CooldownEntered { stability_time: state.stability_time });
}

/// Count the cooldown down; on expiry recentre active nodes and open the
/// recovery window. Returns true if the cooldown ended this frame.
pub fn tick(
    state: &mut SimState,
    dt: f64,
    cfg: &GeneratorConfig,
    events: &mut Vec<SimEvent>,
) -> bool {
    if !state.cooldown.active {
        return false;
    }
    state.cooldown.remaining -= dt;
    if state.cooldown.remaining > 0.0 {
        return false;
    }
    state.cooldown = Cooldown::default();
    state.recovery_until = state.elapsed + cfg.cooldown.recovery_window;
    for node in state.nodes.iter_mut().filter(|n| n.active) {
        node.recenter();
    }
    state.aggregate_output = crate::aggregate::aggregate_output(&state.nodes);
    debug!(until = state.recovery_until, "cooldown over, recovery window open");
    events.push(SimEvent::RecoveryStarted { until: state.recovery_until });
    true
}
