//! Card localization: find card-shaped quadrilaterals in a frame and rectify
//! them into a fixed canonical size.
//!
//! Pipeline (each stage is a hard filter):
//! 1. grayscale, Gaussian smoothing (folded into Canny), Canny edges, square
//!    dilation;
//! 2. contour extraction (outer borders and holes);
//! 3. minimum enclosed area;
//! 4. polygon approximation, exactly 4 convex vertices;
//! 5. bounding-rectangle aspect ratio;
//! 6. suppression of nested duplicates produced by thick edge bands.
//!
//! Detection is a pure function of the image and [`QuadDetectorParams`].
//! Pass a [`DiagnosticsSink`] to observe intermediate images and rejections.

mod detector;
mod diagnostics;
mod overlay;
mod params;
mod rectify;

pub use detector::{find_quads, find_quads_with, QuadDetector, CANNY_SIGMA};
pub use diagnostics::{
    DebugStage, DetectionDiagnostics, DiagnosticsSink, FilterStage, NoDiagnostics, RejectKind,
    RejectReason,
};
pub use overlay::{draw_quads, OVERLAY_COLOR};
pub use params::{ConfigError, DetectorProfile, QuadDetectorParams};
pub use rectify::{warp_card, RectifyError, WarpedCard};

pub use pokervision_core::{order_quad, CardSize, OrderedQuad, Quad};
