use crate::{sample_bilinear_u8, CardSize, ImageBuffer, ImageView, OrderedQuad};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Projective map `dst ~ H * src` in homogeneous coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        let inv = self.h.try_inverse()?;
        normalize_homography(inv).map(Self::new)
    }
}

// Hartley normalisation of 4 points: centroid to the origin, mean distance sqrt(2).
fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let (cx, cy) = pts.iter().fold((0.0_f64, 0.0_f64), |(sx, sy), p| {
        (sx + p.x as f64 / 4.0, sy + p.y as f64 / 4.0)
    });
    let mean_dist = pts
        .iter()
        .map(|p| (p.x as f64 - cx).hypot(p.y as f64 - cy))
        .sum::<f64>()
        / 4.0;

    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

// Any three of the (normalised) points on one line make the system singular.
fn has_collinear_triple(pts: &[Point2<f64>; 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES.iter().any(|&(i, j, k)| {
        let (a, b, c) = (pts[i], pts[j], pts[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        cross.abs() < 1e-9
    })
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 || !s.is_finite() {
        return None;
    }
    Some(h / s)
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when the linear system is singular (three or more collinear points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns [h11 h12 h13 h21 h22 h23 h31 h32], h33 = 1:
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);
    if has_collinear_triple(&src_n) || has_collinear_triple(&dst_n) {
        return None;
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (k, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = r0 + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    // H = T_dst^-1 * Hn * T_src
    let h = t_dst.try_inverse()? * hn * t_src;
    normalize_homography(h).map(Homography::new)
}

/// Map from the image frame of `src` onto the canonical card frame of `size`.
pub fn perspective_map(src: &OrderedQuad, size: CardSize) -> Option<Homography> {
    homography_from_4pt(&src.corners(), &size.corners())
}

/// Resample `src` into an `out_w x out_h` image.
///
/// `h_src_from_dst` maps output pixel coordinates into source coordinates.
/// Output pixel `(x, y)` samples at exactly `(x, y)`: the canonical corners
/// sit on pixel centres `(0,0)..(W-1,H-1)`.
pub fn warp_perspective(
    src: &ImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: usize,
    out_h: usize,
) -> ImageBuffer {
    let channels = src.channels;
    let mut out = ImageBuffer::new(out_w, out_h, channels);

    for y in 0..out_h {
        for x in 0..out_w {
            let ps = h_src_from_dst.apply(Point2::new(x as f32, y as f32));
            let base = (y * out_w + x) * channels;
            for c in 0..channels {
                out.data[base + c] = sample_bilinear_u8(src, ps.x, ps.y, c);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");

        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(50.0_f32, -20.0),
            Point2::new(320.0_f32, 200.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn four_point_solution_recovers_h() {
        let ground_truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let rect = CardSize::default().corners();
        let dst = rect.map(|p| ground_truth.apply(p));

        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 220.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-2);
        }
    }

    #[test]
    fn perspective_map_sends_corners_to_canonical_frame() {
        let quad = OrderedQuad {
            top_left: Point2::new(31.0, 22.0),
            top_right: Point2::new(140.0, 35.0),
            bottom_right: Point2::new(128.0, 190.0),
            bottom_left: Point2::new(18.0, 170.0),
        };
        let size = CardSize::default();
        let h = perspective_map(&quad, size).expect("non-degenerate");
        for (src, dst) in quad.corners().iter().zip(size.corners().iter()) {
            assert_close(h.apply(*src), *dst, 1e-2);
        }
    }

    #[test]
    fn collinear_source_has_no_map() {
        let quad = OrderedQuad {
            top_left: Point2::new(0.0, 0.0),
            top_right: Point2::new(10.0, 10.0),
            bottom_right: Point2::new(20.0, 20.0),
            bottom_left: Point2::new(30.0, 30.0),
        };
        assert!(perspective_map(&quad, CardSize::default()).is_none());
    }

    #[test]
    fn identity_warp_copies_pixels() {
        let data: Vec<u8> = (0..4 * 3 * 3).map(|v| v as u8).collect();
        let src = ImageView {
            width: 4,
            height: 3,
            channels: 3,
            data: &data,
        };
        let out = warp_perspective(&src, &Homography::identity(), 4, 3);
        assert_eq!(out.data, data);
    }
}
