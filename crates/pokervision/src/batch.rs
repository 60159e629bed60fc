//! Directory-level card extraction.
//!
//! [`run_batch`] walks a frames directory, detects card quads in every frame,
//! rectifies each one to the canonical card size and writes
//! `card_<stem>_<i>.<ext>` plus one `debug_<stem>.<ext>` overlay per frame.
//! Frames are independent: a frame that cannot be read or written is logged,
//! recorded in the [`BatchReport`] and skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info, warn};
use pokervision_core::{CardSize, Quad};
use pokervision_detect::{
    draw_quads, warp_card, ConfigError, DetectionDiagnostics, DetectorProfile, QuadDetector,
    QuadDetectorParams, RectifyError, RejectKind,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::io::{load_json, write_json, IoError};

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("cannot list frames in {path}: {source}")]
    FramesDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("image not found: {0}")]
    FrameNotFound(PathBuf),
    #[error("could not read image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("could not write image {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
    #[error(transparent)]
    Io(#[from] IoError),
}

fn default_input_extensions() -> Vec<String> {
    vec!["jpg".to_owned(), "jpeg".to_owned(), "png".to_owned()]
}

fn default_output_extension() -> String {
    "jpg".to_owned()
}

fn default_parallel() -> bool {
    true
}

/// Batch extraction settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub frames_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Case-insensitive extensions of files treated as frames.
    #[serde(default = "default_input_extensions")]
    pub input_extensions: Vec<String>,
    /// Extension (and therefore encoder) of every written image.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
    #[serde(default)]
    pub profile: DetectorProfile,
    /// Explicit thresholds; overrides `profile` when present.
    #[serde(default)]
    pub detector: Option<QuadDetectorParams>,
    #[serde(default)]
    pub card_size: CardSize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl BatchConfig {
    pub fn new(frames_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            output_dir: output_dir.into(),
            input_extensions: default_input_extensions(),
            output_extension: default_output_extension(),
            profile: DetectorProfile::default(),
            detector: None,
            card_size: CardSize::default(),
            parallel: default_parallel(),
            report_path: None,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path)
    }

    /// Thresholds in effect: `detector` if set, else the profile's.
    pub fn detector_params(&self) -> QuadDetectorParams {
        self.detector.clone().unwrap_or_else(|| self.profile.params())
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.input_extensions
                    .iter()
                    .any(|want| want.eq_ignore_ascii_case(ext))
            })
    }

    fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}", self.output_extension))
    }
}

/// Outcome for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: PathBuf,
    pub quads: usize,
    pub cards: Vec<PathBuf>,
    #[serde(default)]
    pub debug_overlay: Option<PathBuf>,
    /// First error hit in the frame; later cards and the overlay are skipped.
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameReport {
    fn new(frame: &Path) -> Self {
        Self {
            frame: frame.to_path_buf(),
            quads: 0,
            cards: Vec::new(),
            debug_overlay: None,
            error: None,
        }
    }
}

/// Totals and per-frame outcomes of [`run_batch`].
///
/// `cards_extracted` counts every card file on disk, including those written
/// before their frame failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub frames_found: usize,
    pub frames_processed: usize,
    pub failures: usize,
    pub cards_extracted: usize,
    pub frames: Vec<FrameReport>,
}

impl BatchReport {
    fn from_frames(frames: Vec<FrameReport>) -> Self {
        let failures = frames.iter().filter(|f| f.error.is_some()).count();
        Self {
            frames_found: frames.len(),
            frames_processed: frames.len() - failures,
            failures,
            cards_extracted: frames.iter().map(|f| f.cards.len()).sum(),
            frames,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path)
    }
}

/// Frame files in `cfg.frames_dir`, sorted by path.
///
/// A missing directory yields no frames.
pub fn discover_frames(cfg: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    let entries = match fs::read_dir(&cfg.frames_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(BatchError::FramesDir {
                path: cfg.frames_dir.clone(),
                source,
            })
        }
    };

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| BatchError::FramesDir {
                path: cfg.frames_dir.clone(),
                source,
            })?
            .path();
        if path.is_file() && cfg.accepts(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Extract every card from every frame in `cfg.frames_dir`.
///
/// Fails only on invalid configuration, an unlistable frames directory, an
/// uncreatable output directory or an unwritable report. With no frames the
/// call returns an empty report and writes nothing.
pub fn run_batch(cfg: &BatchConfig) -> Result<BatchReport, BatchError> {
    let detector = QuadDetector::new(cfg.detector_params())?;
    check_card_size(cfg.card_size)?;

    let frames = discover_frames(cfg)?;
    if frames.is_empty() {
        warn!("no frames in {}", cfg.frames_dir.display());
        return Ok(BatchReport::default());
    }

    fs::create_dir_all(&cfg.output_dir).map_err(|source| BatchError::OutputDir {
        path: cfg.output_dir.clone(),
        source,
    })?;
    debug!(
        "{} frames from {} into {}",
        frames.len(),
        cfg.frames_dir.display(),
        cfg.output_dir.display()
    );

    let process = |path: &PathBuf| process_frame(path, &detector, cfg);

    #[cfg(feature = "rayon")]
    let results: Vec<FrameReport> = if cfg.parallel {
        use rayon::prelude::*;
        frames.par_iter().map(process).collect()
    } else {
        frames.iter().map(process).collect()
    };
    #[cfg(not(feature = "rayon"))]
    let results: Vec<FrameReport> = frames.iter().map(process).collect();

    let report = BatchReport::from_frames(results);
    info!(
        "saved {} cards from {}/{} frames",
        report.cards_extracted, report.frames_processed, report.frames_found
    );
    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
    }
    Ok(report)
}

/// Detect, rectify and persist the cards of one frame.
///
/// Never fails: a read, rectify or write error is logged and stored in
/// [`FrameReport::error`], and `cards` lists the files written before it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(path, detector, cfg), fields(frame = %path.display()))
)]
pub fn process_frame(path: &Path, detector: &QuadDetector, cfg: &BatchConfig) -> FrameReport {
    let mut report = FrameReport::new(path);
    if let Err(err) = extract_cards(path, detector, cfg, &mut report) {
        warn!(
            "skipping rest of {} after {} cards: {err}",
            path.display(),
            report.cards.len()
        );
        report.error = Some(err.to_string());
    }
    report
}

fn extract_cards(
    path: &Path,
    detector: &QuadDetector,
    cfg: &BatchConfig,
    report: &mut FrameReport,
) -> Result<(), BatchError> {
    let image = read_frame(path)?;
    let quads = detector.detect(&image);
    report.quads = quads.len();
    let stem = frame_stem(path);
    info!("{}: {} found", display_name(path), quads.len());

    for (i, quad) in quads.iter().enumerate() {
        let card = warp_card(&image, quad, cfg.card_size)?;
        let out = cfg.output_path(&format!("card_{stem}_{i}"));
        save_rgb(&card.image, &out)?;
        report.cards.push(out);
    }

    let overlay = cfg.output_path(&format!("debug_{stem}"));
    save_rgb(&draw_quads(&image, &quads), &overlay)?;
    report.debug_overlay = Some(overlay);
    Ok(())
}

/// Single-frame detection summary produced by [`inspect_frame`].
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub frame: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quads: Vec<Quad>,
    pub debug_overlay: PathBuf,
    /// Intermediate gray/blur/edge images, when diagnostics were requested.
    pub stage_images: Vec<PathBuf>,
    pub contours: usize,
    pub rejections: BTreeMap<RejectKind, usize>,
}

/// Run detection on one image and write its overlay to `out_dir`.
///
/// With `diagnostics` set, the intermediate stage images are written too and
/// rejection counts are filled in.
pub fn inspect_frame(
    path: &Path,
    params: &QuadDetectorParams,
    out_dir: &Path,
    extension: &str,
    diagnostics: bool,
) -> Result<InspectReport, BatchError> {
    let detector = QuadDetector::new(params.clone())?;
    let image = read_frame(path)?;
    let (width, height) = image.dimensions();
    info!("loaded {} ({width}x{height})", display_name(path));

    let mut diag = DetectionDiagnostics::new();
    let quads = if diagnostics {
        detector.detect_with(&image, &mut diag)
    } else {
        detector.detect(&image)
    };

    fs::create_dir_all(out_dir).map_err(|source| BatchError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let stem = frame_stem(path);

    let mut stage_images = Vec::new();
    for (stage, img) in &diag.images {
        let out = out_dir.join(format!("{}_{stem}.{extension}", stage.file_prefix()));
        img.save(&out).map_err(|source| BatchError::Encode {
            path: out.clone(),
            source,
        })?;
        stage_images.push(out);
    }

    let debug_overlay = out_dir.join(format!("debug_{stem}.{extension}"));
    save_rgb(&draw_quads(&image, &quads), &debug_overlay)?;

    Ok(InspectReport {
        frame: path.to_path_buf(),
        width,
        height,
        quads,
        debug_overlay,
        stage_images,
        contours: diag.contours,
        rejections: diag.counts(),
    })
}

fn check_card_size(size: CardSize) -> Result<(), RectifyError> {
    if size.width < 2 || size.height < 2 {
        return Err(RectifyError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

fn read_frame(path: &Path) -> Result<RgbImage, BatchError> {
    if !path.exists() {
        return Err(BatchError::FrameNotFound(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| BatchError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

fn save_rgb(image: &RgbImage, path: &Path) -> Result<(), BatchError> {
    image.save(path).map_err(|source| BatchError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

fn frame_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_owned())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
