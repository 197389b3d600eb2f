// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Surge Controller

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::node::Node;
use crate::types::{SimEvent, NODE_COUNT};

/// Stability penalty shared by surges and failures. Never goes below zero.
pub fn penalize(stability_time: f64, cfg: &GeneratorConfig) -> f64 {
    (stability_time * cfg.stability.penalty_factor).max(0.0)
}

/// Count down running surges, then fire or re-arm per node.
///
/// A surge fires when an armed, active, non-surging node sits at or below the
/// threshold, and is suppressed entirely while `in_recovery`. A node re-arms
/// only once it climbs above `threshold + hysteresis`.
pub fn update(
    nodes: &mut [Node; NODE_COUNT],
    stability_time: &mut f64,
    dt: f64,
    in_recovery: bool,
    cfg: &GeneratorConfig,
    events: &mut Vec<SimEvent>,
) {
    let s = &cfg.surge;

    for (i, node) in nodes.iter_mut().enumerate() {
        if !node.surging {
            continue;
        }
        node.surge_remaining -= dt;
        if node.surge_remaining <= 0.0 {
            node.surging = false;
            node.surge_remaining = 0.0;
            debug!(node = i, "surge ended");
            events.push(SimEvent::SurgeEnded { node: i });
        }
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        if !node.active || node.surging {
            continue;
        }
        if !in_recovery && node.surge_armed && node.value <= s.threshold {
            node.surging = true;
            node.surge_remaining = s.duration;
            node.surge_armed = false;
            *stability_time = penalize(*stability_time, cfg);
            debug!(node = i, value = node.value, "surge triggered");
            events.push(SimEvent::SurgeTriggered { node: i });
        } else if node.value > s.threshold + s.hysteresis {
            node.surge_armed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::initial_nodes;

    fn run(nodes: &mut [Node; NODE_COUNT], stability: &mut f64, recovery: bool) -> Vec<SimEvent> {
        let mut events = Vec::new();
        update(nodes, stability, 0.05, recovery, &GeneratorConfig::default(), &mut events);
        events
    }

    #[test]
    fn fires_at_threshold_and_penalizes() {
        let mut nodes = initial_nodes();
        let mut stability = 10.0;
        nodes[0].value = 0.35;
        let events = run(&mut nodes, &mut stability, false);
        assert_eq!(events, vec![SimEvent::SurgeTriggered { node: 0 }]);
        assert!(nodes[0].surging && !nodes[0].surge_armed);
        assert_eq!(nodes[0].surge_remaining, 1.5);
        assert!((stability - 9.0).abs() < 1e-12);
    }

    #[test]
    fn no_refire_until_rearmed() {
        let mut nodes = initial_nodes();
        let mut stability = 0.0;
        nodes[0].value = 0.2;
        run(&mut nodes, &mut stability, false);
        nodes[0].surging = false;

        nodes[0].value = 0.39;
        assert!(run(&mut nodes, &mut stability, false).is_empty());
        assert!(!nodes[0].surge_armed, "0.39 is inside the hysteresis band");

        nodes[0].value = 0.2;
        assert!(run(&mut nodes, &mut stability, false).is_empty());

        nodes[0].value = 0.41;
        run(&mut nodes, &mut stability, false);
        assert!(nodes[0].surge_armed);

        nodes[0].value = 0.3;
        assert_eq!(run(&mut nodes, &mut stability, false), vec![SimEvent::SurgeTriggered { node: 0 }]);
    }

    #[test]
    fn suppressed_during_recovery_but_rearms() {
        let mut nodes = initial_nodes();
        let mut stability = 5.0;
        nodes[0].value = 0.1;
        assert!(run(&mut nodes, &mut stability, true).is_empty());
        assert_eq!(stability, 5.0);

        nodes[0].surge_armed = false;
        nodes[0].value = 0.5;
        run(&mut nodes, &mut stability, true);
        assert!(nodes[0].surge_armed);
    }

    #[test]
    fn inactive_nodes_never_surge() {
        let mut nodes = initial_nodes();
        let mut stability = 0.0;
        nodes[1].value = 0.1;
        assert!(run(&mut nodes, &mut stability, false).is_empty());
    }

    #[test]
    fn countdown_lasts_duration() {
        let cfg = GeneratorConfig::default();
        let mut nodes = initial_nodes();
        let mut stability = 0.0;
        nodes[0].value = 0.3;
        let mut events = Vec::new();
        update(&mut nodes, &mut stability, 0.0, false, &cfg, &mut events);
        nodes[0].value = 0.5;

        let dt = 0.01;
        let mut frames = 0;
        while nodes[0].surging {
            update(&mut nodes, &mut stability, dt, false, &cfg, &mut events);
            frames += 1;
        }
        let lasted = frames as f64 * dt;
        assert!((lasted - 1.5).abs() <= dt + 1e-9, "surge lasted {}", lasted);
        assert_eq!(events.last(), Some(&SimEvent::SurgeEnded { node: 0 }));
    }

    #[test]
    fn penalty_never_negative() {
        let cfg = GeneratorConfig::default();
        assert_eq!(penalize(0.0, &cfg), 0.0);
        assert_eq!(penalize(-1.0, &cfg), 0.0);
    }
}
