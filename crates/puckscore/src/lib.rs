//! High-level facade crate for the `puckscore-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core, detection and scoring crates
//! - the versioned [`config::BoardConfig`] with legacy migration
//! - [`session::ScoringSession`], which caches reports for live previews
//! - (feature `image`) helpers that load and letterbox image files
//!
//! ## Quickstart
//!
//! ```no_run
//! use puckscore::config::BoardConfig;
//! use puckscore::frame::{letterbox_image, load_rgba};
//! use puckscore::session::ScoringSession;
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BoardConfig::load_json("board.json")?;
//! let img = load_rgba("frame.png")?;
//! let (buffer, _rect) = letterbox_image(&img, Some(640), Some(480));
//!
//! let mut session = ScoringSession::new(config);
//! let report = session.score_frame(&buffer.view(), Instant::now());
//! if let Some(round) = &report.round {
//!     println!("red {} blue {}", round.red, round.blue);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `puckscore::core`: geometry, RGBA views, letterboxing, HSV, logger.
//! - `puckscore::detect`: region mask, color classifier, blobs, lens correction.
//! - `puckscore::score`: zone scoring, adjudication, game tally.
//! - `puckscore::config`: JSON config load/validate/write.
//! - `puckscore::session`: throttled detect + score over a live feed.
//! - `puckscore::frame`: raw buffer checks and `image` crate helpers.

pub use puckscore_core as core;
pub use puckscore_detect as detect;
pub use puckscore_score as score;

pub use puckscore_core::{CourtGeometry, DriftOffset, Puck, RgbaImageView, Team};
pub use puckscore_detect::{DetectionResult, PuckDetector, PuckDetectorParams};
pub use puckscore_score::{Game, GameGoal, PuckScoreResult, RoundScore, ScoringParams, Zone};

pub mod config;
pub mod frame;
pub mod session;
