// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Zone & Stability Evaluator

//! Classifies the aggregate and each dial into power zones, accumulates
//! stability time while everything is in band, and detects overload.
//!
//! Success and failure are deliberately asymmetric: stability needs the
//! aggregate in the safe band *and* every active node balanced, while a
//! failure needs only the aggregate over the line *or* any single node in the
//! red.

use crate::config::{GeneratorConfig, ZoneBands};
use crate::node::Node;
use crate::types::{SimEvent, Zone};

pub fn classify(value: f64, bands: &ZoneBands) -> Zone {
    if value <= bands.underpower_max {
        Zone::Underpower
    } else if value < bands.safe_min {
        Zone::LowWarn
    } else if value <= bands.safe_max {
        Zone::Safe
    } else if value < bands.overload_min {
        Zone::HighWarn
    } else {
        Zone::Overload
    }
}

pub fn in_safe_band(value: f64, bands: &ZoneBands) -> bool {
    value >= bands.safe_min && value <= bands.safe_max
}

/// Every active node sits inside the balanced band.
pub fn all_nodes_balanced(nodes: &[Node], bands: &ZoneBands) -> bool {
    nodes
        .iter()
        .filter(|n| n.active)
        .all(|n| n.value >= bands.balanced_min && n.value <= bands.balanced_max)
}

/// Aggregate strictly above the overload line, or any active node on or above it.
pub fn is_overloaded(aggregate: f64, nodes: &[Node], bands: &ZoneBands) -> bool {
    aggregate > bands.overload_min
        || nodes.iter().any(|n| n.active && n.value >= bands.overload_min)
}

/// Milestone fractions crossed while stability moved from `before` to `after`.
pub fn crossed_milestones(before: f64, after: f64, goal: f64, milestones: &[f64]) -> Vec<f64> {
    milestones
        .iter()
        .copied()
        .filter(|m| {
            let mark = m * goal;
            before < mark && after >= mark
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Steady,
    Completed,
    Overload,
}

/// Per-frame evaluation while cooldown is inactive.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    nodes: &[Node],
    aggregate: f64,
    elapsed: f64,
    dt: f64,
    in_recovery: bool,
    stability_time: &mut f64,
    cfg: &GeneratorConfig,
    events: &mut Vec<SimEvent>,
) -> Verdict {
    let bands = &cfg.zones;
    let goal = cfg.stability.goal;
    let in_grace = elapsed < cfg.difficulty.grace_period;

    if !in_grace && in_safe_band(aggregate, bands) && all_nodes_balanced(nodes, bands) {
        let before = *stability_time;
        *stability_time = (before + dt).min(goal);
        for fraction in crossed_milestones(before, before + dt, goal, &cfg.stability.milestones) {
            events.push(SimEvent::StabilityMilestone { fraction });
        }
        if before + dt >= goal {
            return Verdict::Completed;
        }
    }

    if !in_grace && !in_recovery && is_overloaded(aggregate, nodes, bands) {
        return Verdict::Overload;
    }
    Verdict::Steady
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::initial_nodes;

    fn cfg() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    #[test]
    fn classification_boundaries() {
        let b = ZoneBands::default();
        assert_eq!(classify(0.1, &b), Zone::Underpower);
        assert_eq!(classify(0.25, &b), Zone::Underpower);
        assert_eq!(classify(0.3, &b), Zone::LowWarn);
        assert_eq!(classify(0.35, &b), Zone::Safe);
        assert_eq!(classify(0.65, &b), Zone::Safe);
        assert_eq!(classify(0.7, &b), Zone::HighWarn);
        assert_eq!(classify(0.75, &b), Zone::Overload);
        assert!(classify(0.7, &b).is_warning());
    }

    #[test]
    fn overload_asymmetry() {
        let b = ZoneBands::default();
        let mut nodes = initial_nodes();
        nodes[0].value = 0.75;
        assert!(is_overloaded(0.5, &nodes, &b), "any single node in the red fails");
        nodes[0].value = 0.5;
        assert!(!is_overloaded(0.75, &nodes, &b), "aggregate must exceed the line");
        assert!(is_overloaded(0.751, &nodes, &b));
    }

    #[test]
    fn no_accumulation_during_grace() {
        let nodes = initial_nodes();
        let mut s = 0.0;
        let mut ev = Vec::new();
        let v = evaluate(&nodes, 0.5, 3.99, 0.05, false, &mut s, &cfg(), &mut ev);
        assert_eq!(v, Verdict::Steady);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn accumulates_when_balanced() {
        let nodes = initial_nodes();
        let mut s = 1.0;
        let mut ev = Vec::new();
        evaluate(&nodes, 0.5, 4.0, 0.05, false, &mut s, &cfg(), &mut ev);
        assert!((s - 1.05).abs() < 1e-12);
    }

    #[test]
    fn unbalanced_node_blocks_accumulation() {
        let mut nodes = initial_nodes();
        nodes[1].active = true;
        nodes[0].value = 0.8;
        nodes[1].value = 0.2;
        let mut s = 1.0;
        let mut ev = Vec::new();
        let v = evaluate(&nodes, 0.5, 10.0, 0.05, false, &mut s, &cfg(), &mut ev);
        assert_eq!(s, 1.0);
        assert_eq!(v, Verdict::Overload);
    }

    #[test]
    fn milestones_fire_once_on_edge() {
        let goal = 20.0;
        let ms = [0.25, 0.5, 0.75];
        assert_eq!(crossed_milestones(4.99, 5.0, goal, &ms), vec![0.25]);
        assert!(crossed_milestones(5.0, 5.05, goal, &ms).is_empty());
        assert_eq!(crossed_milestones(4.9, 15.1, goal, &ms), vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn completes_at_goal() {
        let nodes = initial_nodes();
        let mut s = 19.98;
        let mut ev = Vec::new();
        let v = evaluate(&nodes, 0.5, 30.0, 0.05, false, &mut s, &cfg(), &mut ev);
        assert_eq!(v, Verdict::Completed);
        assert_eq!(s, 20.0);
    }

    #[test]
    fn recovery_suppresses_overload() {
        let mut nodes = initial_nodes();
        nodes[0].value = 0.95;
        let mut s = 0.0;
        let mut ev = Vec::new();
        assert_eq!(
            evaluate(&nodes, 0.95, 10.0, 0.05, true, &mut s, &cfg(), &mut ev),
            Verdict::Steady
        );
        assert_eq!(
            evaluate(&nodes, 0.95, 10.0, 0.05, false, &mut s, &cfg(), &mut ev),
            Verdict::Overload
        );
    }
}
