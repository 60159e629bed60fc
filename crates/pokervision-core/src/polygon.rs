//! Closed-polygon helpers used to filter contour candidates.
//!
//! All functions treat the input as a closed ring: the last vertex connects
//! back to the first.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[inline]
fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Enclosed area (shoelace formula), always non-negative.
pub fn polygon_area(points: &[Point2<f32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (twice.abs() * 0.5) as f32
}

/// Length of the closed boundary.
pub fn perimeter(points: &[Point2<f32>]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (points[(i + 1) % points.len()] - *p).norm())
        .sum()
}

/// Convex with strictly consistent turning direction.
///
/// Collinear consecutive vertices count as non-convex, so a polygon with a
/// zero-length or folded edge is rejected here.
pub fn is_convex(points: &[Point2<f32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let c = cross(points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if c == 0.0 {
            return false;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}

/// Whether `p` lies inside (or on) the convex polygon `poly`.
pub fn contains_point(poly: &[Point2<f32>], p: Point2<f32>) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let c = cross(poly[i], poly[(i + 1) % n], p);
        if c == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = c.signum();
        } else if c.signum() != sign {
            return false;
        }
    }
    true
}

fn segment_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f32::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

// Douglas-Peucker over an open chain; endpoints are always kept.
fn simplify_chain(chain: &[Point2<f32>], epsilon: f32, out: &mut Vec<Point2<f32>>) {
    let n = chain.len();
    if n <= 2 {
        out.extend_from_slice(chain);
        return;
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        let mut best = (0usize, -1.0f32);
        for i in start + 1..end {
            let d = segment_distance(chain[i], chain[start], chain[end]);
            if d > best.1 {
                best = (i, d);
            }
        }
        if best.1 > epsilon {
            keep[best.0] = true;
            stack.push((start, best.0));
            stack.push((best.0, end));
        }
    }

    out.extend(chain.iter().zip(keep).filter(|(_, k)| *k).map(|(p, _)| *p));
}

/// Approximate a closed contour by a polygon within `epsilon` pixels.
///
/// The ring is split at its first point and the point farthest from it, each
/// half is simplified, and a final pass drops vertices that sit within
/// `epsilon` of the line through their neighbours (the split point may land
/// mid-edge).
pub fn approx_polygon_dp(curve: &[Point2<f32>], epsilon: f32) -> Vec<Point2<f32>> {
    let n = curve.len();
    if n < 3 {
        return curve.to_vec();
    }
    let first = curve[0];
    let Some(far) = (1..n).max_by(|&a, &b| {
        (curve[a] - first)
            .norm_squared()
            .total_cmp(&(curve[b] - first).norm_squared())
    }) else {
        return curve.to_vec();
    };

    let mut out = Vec::new();
    simplify_chain(&curve[..=far], epsilon, &mut out);
    out.pop();

    let mut back: Vec<Point2<f32>> = curve[far..].to_vec();
    back.push(first);
    simplify_chain(&back, epsilon, &mut out);
    out.pop();

    loop {
        let m = out.len();
        if m <= 3 {
            break;
        }
        let redundant = (0..m).find(|&i| {
            let prev = out[(i + m - 1) % m];
            let next = out[(i + 1) % m];
            segment_distance(out[i], prev, next) <= epsilon
        });
        match redundant {
            Some(i) => {
                out.remove(i);
            }
            None => break,
        }
    }
    out
}

/// Convex hull (Andrew's monotone chain), counter-clockwise in a y-up frame.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(pts.len() * 2);
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &Point2<f32>>> = if pass == 0 {
            Box::new(pts.iter())
        } else {
            Box::new(pts.iter().rev())
        };
        for &p in iter {
            while hull.len() >= start + 2
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

/// Rotated bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    /// Side along `angle`.
    pub width: f32,
    pub height: f32,
    /// Orientation of the `width` side in radians.
    pub angle: f32,
}

impl RotatedRect {
    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn long_side(&self) -> f32 {
        self.width.max(self.height)
    }

    /// `short / long`, or `None` when either side is (near) zero.
    pub fn aspect_ratio(&self) -> Option<f32> {
        let short = self.short_side();
        if short <= 1e-3 {
            return None;
        }
        Some(short / self.long_side())
    }
}

/// Minimum-area enclosing rectangle.
///
/// One side of the optimal rectangle is collinear with a hull edge, so every
/// hull edge direction is tried.
pub fn min_area_rect(points: &[Point2<f32>]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    if hull.len() < 2 {
        return None;
    }

    let mut best: Option<(f32, RotatedRect)> = None;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let len = edge.norm();
        if len <= f32::EPSILON {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in &hull {
            let d = *p - hull[i];
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let width = max_u - min_u;
        let height = max_v - min_v;
        let area = width * height;
        if best.as_ref().is_none_or(|(a, _)| area < *a) {
            let mid = u * ((min_u + max_u) * 0.5) + v * ((min_v + max_v) * 0.5);
            best = Some((
                area,
                RotatedRect {
                    center: hull[i] + mid,
                    width,
                    height,
                    angle: u.y.atan2(u.x),
                },
            ));
        }
    }
    best.map(|(_, r)| r)
}
