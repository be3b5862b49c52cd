//! Core types and utilities for shuffleboard puck scoring.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any image decoding library: frames arrive as borrowed RGBA
//! buffers and everything downstream works in buffer pixel coordinates.

mod color;
mod geometry;
mod image;
mod letterbox;
mod logger;
mod puck;
mod team;

pub use color::{brightness, hue_distance, rgb_to_hsv, Hsv};
pub use geometry::{side_sign, CourtGeometry, DriftOffset, Segment, Triangle};
pub use image::{sample_bilinear_rgba, RgbaImage, RgbaImageView};
pub use letterbox::{letterbox_into, letterbox_into_buffer, LetterboxRect, BACKGROUND};
pub use puck::Puck;
pub use team::Team;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::{Point2, Vector2};
