// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Input Controller

//! Maps pointer/touch drags onto dial values.
//!
//! Input only ever writes `Node::value` and its own drag bookkeeping; the
//! drift engine runs after input on the next frame and may immediately move
//! the value again.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::GeneratorConfig;
use crate::feedback::CueSink;
use crate::layout::Layout;
use crate::simulation::SimState;
use crate::types::{Cue, Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    pub node: usize,
    pub start_angle: f64,
    pub start_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputController {
    drag: Option<Drag>,
    last_slider_cue_ms: Option<f64>,
}

/// Wrap an angle difference into `(-π, π]`.
pub fn normalize_angle(delta: f64) -> f64 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}

fn input_blocked(state: &SimState) -> bool {
    state.cooldown.active || state.completed
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<usize> {
        self.drag.map(|d| d.node)
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Start a drag on the first active dial under `point`, scanning 0 -> 2.
    pub fn pointer_down(
        &mut self,
        point: Point,
        state: &SimState,
        layout: &Layout,
        cfg: &GeneratorConfig,
        cues: &mut dyn CueSink,
    ) -> Option<usize> {
        if input_blocked(state) || !point.is_finite() {
            trace!(?point, "pointer down ignored");
            return None;
        }
        let reach = layout.dial_radius * cfg.input.hit_tolerance;
        let (node, center) = state
            .nodes
            .iter()
            .zip(layout.dial_centers.iter())
            .enumerate()
            .find(|(_, (n, c))| n.active && point.distance_to(**c) < reach)
            .map(|(i, (_, c))| (i, *c))?;

        self.drag = Some(Drag {
            node,
            start_angle: point.angle_from(center),
            start_value: state.nodes[node].value,
        });
        cues.play(Cue::Tick);
        Some(node)
    }

    /// Rotate the dragged dial. Returns the value written, if any.
    ///
    /// The angle baseline from `pointer_down` is kept across resizes; only the
    /// dial centre is read from the current layout.
    pub fn pointer_move(
        &mut self,
        point: Point,
        now_ms: f64,
        state: &mut SimState,
        layout: &Layout,
        cfg: &GeneratorConfig,
        cues: &mut dyn CueSink,
    ) -> Option<f64> {
        let drag = self.drag?;
        if input_blocked(state) {
            trace!("drag cancelled by cooldown");
            self.drag = None;
            return None;
        }
        if !point.is_finite() {
            return None;
        }

        let center = layout.dial_centers[drag.node];
        let delta = normalize_angle(point.angle_from(center) - drag.start_angle);
        let value = (drag.start_value + delta * cfg.input.sensitivity).clamp(0.0, 1.0);
        state.nodes[drag.node].value = value;

        let due = match self.last_slider_cue_ms {
            Some(last) => now_ms - last > cfg.input.slider_cue_interval_ms,
            None => true,
        };
        if due {
            cues.play(Cue::Slider);
            self.last_slider_cue_ms = Some(now_ms);
        }
        Some(value)
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }
}
