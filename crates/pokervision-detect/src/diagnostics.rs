//! Optional observation hooks for threshold calibration.
//!
//! The production path uses [`NoDiagnostics`], whose methods are empty and
//! inline away. [`DetectionDiagnostics`] records everything.

use std::collections::BTreeMap;

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Intermediate images produced before contour extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugStage {
    Gray,
    Blur,
    /// Dilated edge map.
    Edges,
}

impl DebugStage {
    pub const ALL: [DebugStage; 3] = [DebugStage::Gray, DebugStage::Blur, DebugStage::Edges];

    /// File-name prefix used when the stage image is written to disk.
    pub fn file_prefix(self) -> &'static str {
        match self {
            DebugStage::Gray => "gray",
            DebugStage::Blur => "blur",
            DebugStage::Edges => "edges",
        }
    }
}

/// Filter stage that rejected a contour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    Area,
    Polygon,
    BoundingRect,
    Nesting,
}

/// Why a contour did not become a quad.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    TooSmall { area: f32, min_area: f32 },
    NotQuadrilateral { vertices: usize },
    NonConvex,
    /// Zero-area or collinear candidate.
    Degenerate,
    AspectRatio { ratio: f32 },
    /// Duplicate of the accepted quad at index `of` in the output.
    Nested { of: usize },
}

/// Payload-free discriminant of [`RejectReason`], used as a counting key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectKind {
    TooSmall,
    NotQuadrilateral,
    NonConvex,
    Degenerate,
    AspectRatio,
    Nested,
}

impl RejectReason {
    pub fn kind(&self) -> RejectKind {
        match self {
            RejectReason::TooSmall { .. } => RejectKind::TooSmall,
            RejectReason::NotQuadrilateral { .. } => RejectKind::NotQuadrilateral,
            RejectReason::NonConvex => RejectKind::NonConvex,
            RejectReason::Degenerate => RejectKind::Degenerate,
            RejectReason::AspectRatio { .. } => RejectKind::AspectRatio,
            RejectReason::Nested { .. } => RejectKind::Nested,
        }
    }

    pub fn stage(&self) -> FilterStage {
        match self.kind() {
            RejectKind::TooSmall => FilterStage::Area,
            RejectKind::NotQuadrilateral | RejectKind::NonConvex => FilterStage::Polygon,
            RejectKind::Degenerate | RejectKind::AspectRatio => FilterStage::BoundingRect,
            RejectKind::Nested => FilterStage::Nesting,
        }
    }
}

/// Receiver of detector internals. Every method defaults to a no-op.
pub trait DiagnosticsSink {
    /// Whether stage images that cost extra work to build should be produced.
    fn wants_images(&self) -> bool {
        false
    }

    fn stage_image(&mut self, _stage: DebugStage, _image: &GrayImage) {}

    fn contours_found(&mut self, _count: usize) {}

    fn contour_rejected(&mut self, _contour: usize, _reason: RejectReason) {}

    fn contour_accepted(&mut self, _contour: usize) {}
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl DiagnosticsSink for NoDiagnostics {}

/// Collects intermediate images and per-contour outcomes.
#[derive(Clone, Debug, Default)]
pub struct DetectionDiagnostics {
    pub contours: usize,
    /// Contour indices that became quads, in output order.
    pub accepted: Vec<usize>,
    pub rejections: Vec<(usize, RejectReason)>,
    pub images: BTreeMap<DebugStage, GrayImage>,
}

impl DetectionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejection counts keyed by reason.
    pub fn counts(&self) -> BTreeMap<RejectKind, usize> {
        let mut out = BTreeMap::new();
        for (_, reason) in &self.rejections {
            *out.entry(reason.kind()).or_insert(0) += 1;
        }
        out
    }

    /// Rejection counts keyed by filter stage.
    pub fn counts_by_stage(&self) -> BTreeMap<FilterStage, usize> {
        let mut out = BTreeMap::new();
        for (_, reason) in &self.rejections {
            *out.entry(reason.stage()).or_insert(0) += 1;
        }
        out
    }

    pub fn image(&self, stage: DebugStage) -> Option<&GrayImage> {
        self.images.get(&stage)
    }
}

impl DiagnosticsSink for DetectionDiagnostics {
    fn wants_images(&self) -> bool {
        true
    }

    fn stage_image(&mut self, stage: DebugStage, image: &GrayImage) {
        self.images.insert(stage, image.clone());
    }

    fn contours_found(&mut self, count: usize) {
        self.contours = count;
    }

    fn contour_rejected(&mut self, contour: usize, reason: RejectReason) {
        self.rejections.push((contour, reason));
    }

    fn contour_accepted(&mut self, contour: usize) {
        self.accepted.push(contour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_by_kind_and_stage() {
        let mut diag = DetectionDiagnostics::new();
        diag.contour_rejected(0, RejectReason::NonConvex);
        diag.contour_rejected(
            1,
            RejectReason::TooSmall {
                area: 3.0,
                min_area: 10.0,
            },
        );
        diag.contour_rejected(2, RejectReason::NotQuadrilateral { vertices: 7 });
        diag.contour_rejected(3, RejectReason::TooSmall {
            area: 1.0,
            min_area: 10.0,
        });

        let counts = diag.counts();
        assert_eq!(counts[&RejectKind::TooSmall], 2);
        assert_eq!(counts[&RejectKind::NonConvex], 1);
        assert!(!counts.contains_key(&RejectKind::AspectRatio));

        let stages = diag.counts_by_stage();
        assert_eq!(stages[&FilterStage::Polygon], 2);
        assert_eq!(stages[&FilterStage::Area], 2);
    }
}
