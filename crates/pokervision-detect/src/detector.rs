use std::borrow::Cow;

use image::{GrayImage, RgbImage};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use log::{debug, trace};
use nalgebra::Point2;
use pokervision_core::{
    approx_polygon_dp, contains_point, is_convex, min_area_rect, perimeter, polygon_area, Quad,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{ConfigError, DebugStage, DiagnosticsSink, NoDiagnostics, QuadDetectorParams, RejectReason};

/// Smoothing `imageproc::edges::canny` applies before its gradient step.
pub const CANNY_SIGMA: f32 = 1.4;

/// Card-shaped quadrilateral detector with validated thresholds.
#[derive(Clone, Debug)]
pub struct QuadDetector {
    params: QuadDetectorParams,
}

struct Accepted {
    quad: Quad,
    area: f32,
}

impl QuadDetector {
    pub fn new(params: QuadDetectorParams) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &QuadDetectorParams {
        &self.params
    }

    /// Detect quads in a color frame.
    pub fn detect(&self, image: &RgbImage) -> Vec<Quad> {
        self.detect_with(image, &mut NoDiagnostics)
    }

    /// Detect quads in a color frame, reporting internals to `sink`.
    pub fn detect_with<S: DiagnosticsSink + ?Sized>(
        &self,
        image: &RgbImage,
        sink: &mut S,
    ) -> Vec<Quad> {
        let gray = image::imageops::grayscale(image);
        self.detect_gray_with(&gray, sink)
    }

    /// Detect quads in an intensity image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, gray, sink), fields(width = gray.width(), height = gray.height()))
    )]
    pub fn detect_gray_with<S: DiagnosticsSink + ?Sized>(
        &self,
        gray: &GrayImage,
        sink: &mut S,
    ) -> Vec<Quad> {
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }

        sink.stage_image(DebugStage::Gray, gray);
        let edges = self.edge_map(gray, sink);

        let contours = find_contours::<i32>(&edges);
        sink.contours_found(contours.len());

        let min_area = self.params.min_area_fraction * (w as f32 * h as f32);
        let mut accepted: Vec<Accepted> = Vec::new();

        for (idx, contour) in contours.iter().enumerate() {
            let points: Vec<Point2<f32>> = contour
                .points
                .iter()
                .map(|p| Point2::new(p.x as f32, p.y as f32))
                .collect();

            match self.filter_contour(&points, min_area, &accepted) {
                Ok(candidate) => {
                    sink.contour_accepted(idx);
                    accepted.push(candidate);
                }
                Err(reason) => {
                    trace!("contour {idx} rejected: {reason:?}");
                    sink.contour_rejected(idx, reason);
                }
            }
        }

        debug!(
            "{} contours, {} quads accepted ({}x{}, min_area={:.1})",
            contours.len(),
            accepted.len(),
            w,
            h,
            min_area
        );
        accepted.into_iter().map(|a| a.quad).collect()
    }

    fn edge_map<S: DiagnosticsSink + ?Sized>(&self, gray: &GrayImage, sink: &mut S) -> GrayImage {
        // Gaussians compose in quadrature; canny supplies CANNY_SIGMA of the total.
        let residual = residual_sigma(self.params.blur_sigma);
        let pre: Cow<'_, GrayImage> = if residual > 0.0 {
            Cow::Owned(gaussian_blur_f32(gray, residual))
        } else {
            Cow::Borrowed(gray)
        };
        if sink.wants_images() {
            sink.stage_image(DebugStage::Blur, &gaussian_blur_f32(&*pre, CANNY_SIGMA));
        }

        let mut edges = canny(&*pre, self.params.canny_low, self.params.canny_high);
        // LInf ball of radius k == k passes of a 3x3 square element.
        if self.params.dilate_iterations > 0 {
            edges = dilate(&edges, Norm::LInf, self.params.dilate_iterations);
        }
        sink.stage_image(DebugStage::Edges, &edges);
        edges
    }

    fn filter_contour(
        &self,
        points: &[Point2<f32>],
        min_area: f32,
        accepted: &[Accepted],
    ) -> Result<Accepted, RejectReason> {
        let area = polygon_area(points);
        if area < min_area {
            return Err(RejectReason::TooSmall { area, min_area });
        }

        let epsilon = self.params.approx_epsilon_fraction * perimeter(points);
        let poly = approx_polygon_dp(points, epsilon);
        if poly.len() != 4 {
            return Err(RejectReason::NotQuadrilateral {
                vertices: poly.len(),
            });
        }
        if !is_convex(&poly) {
            return Err(RejectReason::NonConvex);
        }

        let ratio = min_area_rect(&poly)
            .and_then(|r| r.aspect_ratio())
            .ok_or(RejectReason::Degenerate)?;
        if ratio < self.params.aspect_min || ratio > self.params.aspect_max {
            return Err(RejectReason::AspectRatio { ratio });
        }

        let quad_area = polygon_area(&poly);
        if quad_area <= f32::EPSILON {
            return Err(RejectReason::Degenerate);
        }
        if let Some(of) = self.nested_in(&poly, quad_area, accepted) {
            return Err(RejectReason::Nested { of });
        }

        Ok(Accepted {
            quad: Quad::new([poly[0], poly[1], poly[2], poly[3]]),
            area: quad_area,
        })
    }

    fn nested_in(&self, poly: &[Point2<f32>], area: f32, accepted: &[Accepted]) -> Option<usize> {
        accepted.iter().position(|other| {
            let ratio = area.min(other.area) / area.max(other.area);
            if ratio < self.params.nested_min_area_ratio {
                return false;
            }
            let inside = poly.iter().all(|&p| contains_point(&other.quad.points, p));
            let around = other.quad.points.iter().all(|&p| contains_point(poly, p));
            inside || around
        })
    }
}

fn residual_sigma(total: f32) -> f32 {
    (total * total - CANNY_SIGMA * CANNY_SIGMA).max(0.0).sqrt()
}

/// Validate `params` and detect quads in `image`.
pub fn find_quads(image: &RgbImage, params: &QuadDetectorParams) -> Result<Vec<Quad>, ConfigError> {
    find_quads_with(image, params, &mut NoDiagnostics)
}

/// [`find_quads`] with a diagnostics sink.
pub fn find_quads_with<S: DiagnosticsSink + ?Sized>(
    image: &RgbImage,
    params: &QuadDetectorParams,
    sink: &mut S,
) -> Result<Vec<Quad>, ConfigError> {
    let detector = QuadDetector::new(params.clone())?;
    Ok(detector.detect_with(image, sink))
}
