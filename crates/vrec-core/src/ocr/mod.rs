//! OCR collaborator interface and image preparation.
//!
//! Recognition itself is delegated to an [`OcrBackend`]. The native build
//! ships [`PureOcrEngine`]; in the browser recognition happens on the JS side
//! and only the text reaches this crate.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// Something that turns an image into best-effort text.
pub trait OcrBackend: Send + Sync {
    /// Recognize the text in an image using the given language hint
    /// (e.g. `"eng+jpn"`). Empty or garbled output is not an error.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for std::sync::Arc<T> {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        (**self).recognize(image, language)
    }
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        (**self).recognize(image, language)
    }
}
