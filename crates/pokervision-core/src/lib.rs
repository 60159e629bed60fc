//! Core types and utilities for playing-card localization.
//!
//! This crate is purely geometric. It does *not* depend on any concrete edge
//! detector or image codec: images come in as lightweight row-major views and
//! rectified cards go out as owned buffers.

mod homography;
mod image;
mod logger;
mod polygon;
mod quad;

pub use homography::{homography_from_4pt, perspective_map, warp_perspective, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, ImageBuffer, ImageView};
pub use polygon::{
    approx_polygon_dp, contains_point, convex_hull, is_convex, min_area_rect, perimeter,
    polygon_area, RotatedRect,
};
pub use quad::{order_quad, CardSize, OrderedQuad, Quad};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
