use serde::{Deserialize, Serialize};

/// Invalid detector or rectifier configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("canny thresholds must satisfy 0 <= low <= high (low={low}, high={high})")]
    CannyThresholds { low: f32, high: f32 },
    #[error("blur sigma must be positive and finite (got {0})")]
    BlurSigma(f32),
    #[error("min_area_fraction must lie in (0, 1] (got {0})")]
    MinAreaFraction(f32),
    #[error("approx_epsilon_fraction must be positive and finite (got {0})")]
    ApproxEpsilon(f32),
    #[error("aspect bounds must satisfy 0 < min <= max <= 1 (min={min}, max={max})")]
    AspectBounds { min: f32, max: f32 },
    #[error("nested_min_area_ratio must be positive (got {0})")]
    NestedRatio(f32),
    #[error("unknown detector profile `{0}` (expected `tight` or `loose`)")]
    UnknownProfile(String),
}

/// Thresholds for the quad detector.
///
/// `Default` is the [`DetectorProfile::Loose`] profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadDetectorParams {
    /// Canny hysteresis low threshold (gradient magnitude).
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Total Gaussian sigma seen by the edge gradient. Canny itself smooths
    /// with [`CANNY_SIGMA`](crate::CANNY_SIGMA); smaller values add nothing.
    pub blur_sigma: f32,
    /// 3x3 square dilations applied to the edge map; closes small gaps
    /// left by glare and occlusion.
    pub dilate_iterations: u8,
    /// Contours enclosing less than this fraction of the image are noise.
    pub min_area_fraction: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_fraction: f32,
    /// Lower bound on `short / long` of the bounding rectangle.
    pub aspect_min: f32,
    /// Upper bound on `short / long` of the bounding rectangle.
    pub aspect_max: f32,
    /// A candidate nested inside (or around) an accepted quad whose area
    /// ratio to it is at least this value is the same card edge seen from the
    /// other side of the dilated band. Values above 1 disable the check.
    pub nested_min_area_ratio: f32,
}

impl Default for QuadDetectorParams {
    fn default() -> Self {
        DetectorProfile::Loose.params()
    }
}

impl QuadDetectorParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            canny_low: low,
            canny_high: high,
            ..
        } = *self;
        if !(low.is_finite() && high.is_finite() && 0.0 <= low && low <= high) {
            return Err(ConfigError::CannyThresholds { low, high });
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(ConfigError::BlurSigma(self.blur_sigma));
        }
        if !(self.min_area_fraction > 0.0 && self.min_area_fraction <= 1.0) {
            return Err(ConfigError::MinAreaFraction(self.min_area_fraction));
        }
        if !(self.approx_epsilon_fraction.is_finite() && self.approx_epsilon_fraction > 0.0) {
            return Err(ConfigError::ApproxEpsilon(self.approx_epsilon_fraction));
        }
        let (min, max) = (self.aspect_min, self.aspect_max);
        if !(min > 0.0 && min <= max && max <= 1.0) {
            return Err(ConfigError::AspectBounds { min, max });
        }
        if !(self.nested_min_area_ratio > 0.0) {
            return Err(ConfigError::NestedRatio(self.nested_min_area_ratio));
        }
        Ok(())
    }
}

/// Named calibration presets sharing one detection algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorProfile {
    /// Strong edges, larger cards, narrow aspect window. Few false positives
    /// on cluttered tables.
    Tight,
    /// Weak edges and small cards accepted; the general-purpose default.
    #[default]
    Loose,
}

impl DetectorProfile {
    pub fn params(self) -> QuadDetectorParams {
        match self {
            DetectorProfile::Tight => QuadDetectorParams {
                canny_low: 50.0,
                canny_high: 150.0,
                blur_sigma: 1.4,
                dilate_iterations: 1,
                min_area_fraction: 0.01,
                approx_epsilon_fraction: 0.02,
                aspect_min: 0.65,
                aspect_max: 0.75,
                nested_min_area_ratio: 0.5,
            },
            DetectorProfile::Loose => QuadDetectorParams {
                canny_low: 30.0,
                canny_high: 120.0,
                blur_sigma: 1.4,
                dilate_iterations: 2,
                min_area_fraction: 0.002,
                approx_epsilon_fraction: 0.015,
                aspect_min: 0.60,
                aspect_max: 0.80,
                nested_min_area_ratio: 0.5,
            },
        }
    }
}

impl std::str::FromStr for DetectorProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tight" => Ok(DetectorProfile::Tight),
            "loose" => Ok(DetectorProfile::Loose),
            _ => Err(ConfigError::UnknownProfile(s.to_owned())),
        }
    }
}
