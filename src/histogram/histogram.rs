use std::path::Path;

use image::{DynamicImage, GrayImage};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::image_store::open_image;

/// Number of intensity buckets: one per 8-bit value.
pub const BINS: usize = 256;

/// Pixel-intensity frequency counts of a single-channel image.
///
/// `counts[i]` is the number of pixels with intensity exactly `i`, so the
/// counts always sum to the pixel count of the source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// Counts every pixel of an 8-bit grayscale image.
    pub fn from_luma(img: &GrayImage) -> Histogram {
        let mut counts = vec![0u64; BINS];
        for p in img.pixels() {
            counts[p.0[0] as usize] += 1;
        }
        Histogram { counts }
    }

    /// Luminance-converts `img` and counts it.
    pub fn from_image(img: &DynamicImage) -> Histogram {
        Histogram::from_luma(&img.to_luma8())
    }

    /// Opens and decodes the image at `path`. Unreadable or undecodable files
    /// are `NotFound`.
    pub fn open(path: &Path) -> Result<Histogram> {
        let img = open_image(path).map_err(|e| {
            Error::not_found(format!("Image '{}' could not be read: {}", display_name(path), e))
        })?;
        Ok(Histogram::from_image(&img))
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// File name only; full server paths stay out of user-facing messages.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
