//! Image cleanup before OCR.

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::PreprocessConfig;

/// Prepares voucher photos for recognition: upscale, grayscale, contrast and
/// brightness boost.
///
/// Contrast and brightness are linear factors on each color channel, as in
/// CSS filters: contrast stretches around mid-gray, brightness multiplies.
/// Each step clamps to the channel range.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    grayscale: bool,
    scale: f32,
    contrast: f32,
    brightness: f32,
    max_size: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessConfig::default())
    }

    pub fn from_config(config: &PreprocessConfig) -> Self {
        Self {
            grayscale: config.grayscale,
            scale: config.scale,
            contrast: config.contrast,
            brightness: config.brightness,
            max_size: config.max_image_size,
        }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Set the upscale factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Apply the configured cleanup to an image.
    pub fn process(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("empty image {}x{}", width, height)));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(OcrError::Preprocessing(format!("invalid scale {}", self.scale)));
        }

        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        debug!("Preprocessing {}x{} -> {}x{}", width, height, new_width, new_height);

        let mut processed = if (new_width, new_height) == (width, height) {
            image.clone()
        } else {
            image.resize_exact(new_width, new_height, FilterType::Lanczos3)
        };

        if self.grayscale {
            processed = processed.grayscale();
        }
        if self.contrast != 1.0 || self.brightness != 1.0 {
            processed = self.adjust_tone(processed);
        }

        Ok(processed)
    }

    /// Apply contrast then brightness through a lookup table, keeping alpha.
    fn adjust_tone(&self, image: DynamicImage) -> DynamicImage {
        let mut lut = [0u8; 256];
        for (value, out) in lut.iter_mut().enumerate() {
            *out = tone_map(value as u8, self.contrast, self.brightness);
        }

        match image {
            DynamicImage::ImageLuma8(mut buffer) => {
                for pixel in buffer.pixels_mut() {
                    pixel.0[0] = lut[pixel.0[0] as usize];
                }
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                let mut buffer = other.into_rgba8();
                for pixel in buffer.pixels_mut() {
                    for channel in pixel.0.iter_mut().take(3) {
                        *channel = lut[*channel as usize];
                    }
                }
                DynamicImage::ImageRgba8(buffer)
            }
        }
    }

    /// Scaled dimensions, shrunk to fit `max_size` on the longer side.
    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let mut new_width = (width as f32 * self.scale).round();
        let mut new_height = (height as f32 * self.scale).round();

        let max_dim = new_width.max(new_height);
        if max_dim > self.max_size as f32 {
            let fit = self.max_size as f32 / max_dim;
            new_width *= fit;
            new_height *= fit;
        }

        ((new_width as u32).max(1), (new_height as u32).max(1))
    }
}

fn tone_map(value: u8, contrast: f32, brightness: f32) -> u8 {
    let v = f32::from(value) / 255.0;
    let contrasted = ((v - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
    let brightened = (contrasted * brightness).clamp(0.0, 1.0);
    (brightened * 255.0).round() as u8
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
