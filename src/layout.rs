// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Generator Power Task Engine - Panel Layout

use serde::{Deserialize, Serialize};

use crate::types::{Point, NODE_COUNT};

const DIAL_SPACING: f64 = 0.3;
const DIAL_ROW: f64 = 0.35;
const PANEL_GAP: f64 = 40.0;
const PANEL_INSET: f64 = 60.0;
const MAX_DIAL_HEIGHT: f64 = 0.28;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Hit-test and drawing geometry for one surface size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub dial_centers: [Point; NODE_COUNT],
    pub dial_radius: f64,
    pub gauge: Rect,
}

impl Layout {
    pub fn compute(width: f64, height: f64) -> Self {
        let w = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let h = if height.is_finite() { height.max(0.0) } else { 0.0 };

        let spacing = w * DIAL_SPACING;
        let cx = w / 2.0;
        let cy = h * DIAL_ROW;
        let panel_w = spacing - PANEL_GAP;
        let max_r = (panel_w - PANEL_INSET * 2.0) / 2.0;
        let dial_radius = max_r.min(h * MAX_DIAL_HEIGHT).max(0.0);

        let gauge_w = w * 0.7;
        Self {
            width: w,
            height: h,
            dial_centers: [
                Point::new(cx - spacing, cy),
                Point::new(cx, cy),
                Point::new(cx + spacing, cy),
            ],
            dial_radius,
            gauge: Rect { x: (w - gauge_w) / 2.0, y: h * 0.75, w: gauge_w, h: h * 0.03 },
        }
    }

    /// Where overload sparks originate.
    pub fn gauge_anchor(&self) -> Point {
        Point::new(self.width / 2.0, self.height * 0.72)
    }
}

impl Default for Layout {
    fn default() -> Self {
        // 860 css px wide at 2x backing scale
        Self::compute(1720.0, 1066.0)
    }
}
