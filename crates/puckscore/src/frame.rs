//! Frame helpers: wrapping raw RGBA bytes and, with the `image` feature,
//! loading and letterboxing `image::RgbaImage` frames.

use crate::core::RgbaImageView;

#[cfg(feature = "image")]
use crate::core::{letterbox_into, LetterboxRect, RgbaImage};
#[cfg(feature = "image")]
use std::path::Path;

/// Errors produced when turning external pixel data into frames.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGBA buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbaBuffer { expected: usize, got: usize },

    #[error("invalid RGBA image dimensions (width={width}, height={height})")]
    InvalidRgbaDimensions { width: usize, height: usize },

    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Wrap a raw row-major RGBA buffer after checking its length.
pub fn rgba_view_from_slice(
    width: usize,
    height: usize,
    data: &[u8],
) -> Result<RgbaImageView<'_>, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidRgbaDimensions { width, height });
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(DetectError::InvalidRgbaDimensions { width, height })?;
    if data.len() != expected {
        return Err(DetectError::InvalidRgbaBuffer {
            expected,
            got: data.len(),
        });
    }
    Ok(RgbaImageView {
        width,
        height,
        data,
    })
}

/// Borrow an `image::RgbaImage` as a core view.
#[cfg(feature = "image")]
pub fn rgba_view(img: &::image::RgbaImage) -> RgbaImageView<'_> {
    RgbaImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Decode any supported image file into RGBA.
#[cfg(feature = "image")]
pub fn load_rgba(path: impl AsRef<Path>) -> Result<::image::RgbaImage, DetectError> {
    Ok(::image::open(path)?.to_rgba8())
}

/// Letterbox `img` into a `width x height` working buffer.
///
/// `None` dimensions keep the source size, which makes the copy 1:1.
#[cfg(feature = "image")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(img),
        fields(src_w = img.width(), src_h = img.height())
    )
)]
pub fn letterbox_image(
    img: &::image::RgbaImage,
    width: Option<usize>,
    height: Option<usize>,
) -> (RgbaImage, LetterboxRect) {
    let w = width.unwrap_or(img.width() as usize);
    let h = height.unwrap_or(img.height() as usize);
    letterbox_into(&rgba_view(img), w, h)
}
