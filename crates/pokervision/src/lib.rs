//! Facade crate for the `pokervision-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry, detection and equity crates
//! - [`batch`]: directory-level card extraction (detect, rectify, persist)
//! - [`io`]: JSON helpers for batch configs and reports
//! - the `pokervision` command-line tool (feature `cli`)
//!
//! ## Quickstart
//!
//! ```no_run
//! use pokervision::batch::{run_batch, BatchConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = BatchConfig::new("data/frames", "data/cards");
//! let report = run_batch(&cfg)?;
//! println!("saved {} cards", report.cards_extracted);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pokervision::core`: quads, homographies, polygon helpers, logger.
//! - `pokervision::detect`: quad detector, profiles, diagnostics, rectification.
//! - `pokervision::equity`: cards, deck, hand state, evaluator, simulator.

pub use pokervision_core as core;
pub use pokervision_detect as detect;
pub use pokervision_equity as equity;

pub use pokervision_core::{CardSize, OrderedQuad, Quad};
pub use pokervision_detect::{find_quads, warp_card, DetectorProfile, QuadDetectorParams, WarpedCard};
pub use pokervision_equity::{simulate, HandState, SimulationResult};

pub mod batch;
pub mod io;

#[cfg(feature = "tracing")]
pub use pokervision_core::init_tracing;
