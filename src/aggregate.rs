// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Aggregator

use crate::node::{Node, CENTER};

/// Mean value over active nodes, clamped to `[0, 1]`. `CENTER` if none are
/// active.
pub fn aggregate_output(nodes: &[Node]) -> f64 {
    let (sum, count) = nodes
        .iter()
        .filter(|n| n.active)
        .fold((0.0, 0usize), |(s, c), n| (s + n.value, c + 1));
    if count == 0 {
        return CENTER;
    }
    (sum / count as f64).clamp(0.0, 1.0)
}
