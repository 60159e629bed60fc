use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Four card-boundary vertices in image coordinates, in no particular order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point2<f32>; 4],
}

impl Quad {
    pub fn new(points: [Point2<f32>; 4]) -> Self {
        Self { points }
    }

    /// Canonical corner roles, see [`order_quad`].
    pub fn ordered(&self) -> OrderedQuad {
        order_quad(&self.points)
    }
}

/// Quad with fixed corner roles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderedQuad {
    pub top_left: Point2<f32>,
    pub top_right: Point2<f32>,
    pub bottom_right: Point2<f32>,
    pub bottom_left: Point2<f32>,
}

impl OrderedQuad {
    /// Corners as TL, TR, BR, BL.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Size of the canonical card frame every detection is rectified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: usize,
    pub height: usize,
}

impl Default for CardSize {
    fn default() -> Self {
        Self {
            width: 200,
            height: 300,
        }
    }
}

impl CardSize {
    /// Destination corners `(0,0), (W-1,0), (W-1,H-1), (0,H-1)`.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        let w = self.width.saturating_sub(1) as f32;
        let h = self.height.saturating_sub(1) as f32;
        [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ]
    }
}

/// Assign corner roles from coordinates alone.
///
/// - top-left minimises `x + y`, bottom-right maximises it;
/// - top-right minimises `y - x`, bottom-left maximises it.
///
/// On an exact tie the first point in input order wins. The result does not
/// depend on input order for any convex quad without such ties.
pub fn order_quad(points: &[Point2<f32>; 4]) -> OrderedQuad {
    let sum = points.map(|p| p.x + p.y);
    let diff = points.map(|p| p.y - p.x);
    OrderedQuad {
        top_left: points[argmin(&sum)],
        top_right: points[argmin(&diff)],
        bottom_right: points[argmax(&sum)],
        bottom_left: points[argmax(&diff)],
    }
}

fn argmin(values: &[f32; 4]) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}

fn argmax(values: &[f32; 4]) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}
