// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Drift Engine

//! Autonomous per-frame movement of every active dial.
//!
//! Speed ramps linearly from `drift_speed` to `drift_speed_max` over
//! `ramp_time`, later nodes drift faster, and each node has its own signal
//! shape: node 0 a single slow sine, node 1 two sines, node 2 two sines with
//! the widest noise term.

use crate::config::GeneratorConfig;
use crate::node::Node;
use crate::noise::NoiseSource;
use crate::types::NODE_COUNT;

/// Global drift speed at `elapsed`.
pub fn base_speed(elapsed: f64, cfg: &GeneratorConfig) -> f64 {
    let d = &cfg.difficulty;
    let progress = (elapsed / d.ramp_time).clamp(0.0, 1.0);
    d.drift_speed + (d.drift_speed_max - d.drift_speed) * progress
}

pub fn speed_multiplier(index: usize) -> f64 {
    1.0 + index as f64 * 0.25
}

pub fn phase_rate(index: usize) -> f64 {
    0.5 + index as f64 * 0.15
}

/// Deterministic part of a node's drift signal.
pub fn waveform(index: usize, phase: f64) -> f64 {
    match index {
        0 => (phase * 0.8).sin() * 0.6,
        1 => (phase * 1.0).sin() * 0.5 + (phase * 2.0 + 1.5).sin() * 0.3,
        _ => (phase * 1.2).sin() * 0.45 + (phase * 2.5 + 3.0).sin() * 0.3,
    }
}

/// Peak-to-peak width of a node's noise term.
pub fn noise_amplitude(index: usize) -> f64 {
    match index {
        0 => 0.05,
        1 => 0.08,
        _ => 0.12,
    }
}

/// Advance every active node by one frame. Inactive nodes are untouched.
pub fn advance(
    nodes: &mut [Node; NODE_COUNT],
    elapsed: f64,
    dt: f64,
    cfg: &GeneratorConfig,
    noise: &mut impl NoiseSource,
) {
    let base = base_speed(elapsed, cfg);
    for (i, node) in nodes.iter_mut().enumerate() {
        if !node.active {
            continue;
        }
        node.drift_phase += dt * phase_rate(i);

        let signal = waveform(i, node.drift_phase) + noise.centered(noise_amplitude(i));
        let drift = base * speed_multiplier(i) * dt * signal;
        let push = if node.surging { dt * cfg.surge.push_rate } else { 0.0 };

        node.value = cfg.clamp_value(node.value + drift + push);
    }
}
