//! Image → input-vector conversion for the bundled classifier.
//!
//! Images are resized to the model's declared dimensions (Lanczos3) and
//! pixel values normalized to [0, 1].

use image::{imageops::FilterType, DynamicImage};

use crate::classify::model::InputType;

/// Returns the flat input vector `input` describes for `img`.
pub fn image_to_input(img: &DynamicImage, input: &InputType) -> Vec<f64> {
    match *input {
        InputType::ImageGrayscale { width, height } => {
            let resized = img.resize_exact(width, height, FilterType::Lanczos3);
            resized.to_luma8().pixels().map(|p| p.0[0] as f64 / 255.0).collect()
        }
        InputType::ImageRgb { width, height } => {
            let resized = img.resize_exact(width, height, FilterType::Lanczos3);
            resized.to_rgb8()
                .pixels()
                .flat_map(|p| p.0.iter().map(|&c| c as f64 / 255.0))
                .collect()
        }
    }
}
