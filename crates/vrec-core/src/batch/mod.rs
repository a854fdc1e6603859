//! Batch extraction: one result per input image, in input order.

#[cfg(feature = "native")]
mod worker;

#[cfg(feature = "native")]
pub use worker::{wait_for_results, BatchWorker};

use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::config::VrecConfig;
use crate::models::record::ExtractionRecord;
use crate::ocr::{ImagePreprocessor, OcrBackend};
use crate::voucher::VoucherExtractor;

/// Where an image's bytes come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceData {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// One image to process, with the name results are reported under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    pub name: String,
    pub data: SourceData,
}

impl ImageSource {
    /// Image on disk, named after its file name.
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            data: SourceData::File(path.to_path_buf()),
        }
    }

    /// Encoded image bytes already in memory.
    pub fn memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data: SourceData::Memory(bytes),
        }
    }

    /// Read and decode the image.
    pub fn load(&self) -> Result<DynamicImage> {
        let image = match &self.data {
            SourceData::File(path) => image::load_from_memory(&std::fs::read(path)?)?,
            SourceData::Memory(bytes) => image::load_from_memory(bytes)?,
        };
        Ok(image)
    }
}

/// What to produce for each image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Raw OCR text blocks.
    Full,
    /// Code and amount records.
    #[default]
    Code,
}

/// Result for one image.
///
/// Serialized untagged: full-text output is a plain string, records are
/// objects. Failures are records in both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutput {
    Text(String),
    Record(ExtractionRecord),
}

impl BatchOutput {
    pub fn as_record(&self) -> Option<&ExtractionRecord> {
        match self {
            BatchOutput::Record(record) => Some(record),
            BatchOutput::Text(_) => None,
        }
    }
}

/// Request sent to a batch worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub sources: Vec<ImageSource>,
    pub mode: BatchMode,
}

/// Progress notice sent before an image is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// 1-based position of the image in the batch.
    pub index: usize,
    pub total: usize,
    pub source: String,
    /// Human-readable status line.
    pub text: String,
}

impl Progress {
    pub fn new(index: usize, total: usize, source: impl Into<String>) -> Self {
        let source = source.into();
        let text = format!("Processing {} ({}/{})", source, index, total);
        Self {
            index,
            total,
            source,
            text,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Messages from a batch worker: any number of `progress`, then one `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkerMessage {
    Progress(Progress),
    Done { results: Vec<BatchOutput> },
}

/// Block of text emitted per image in full-text mode.
pub fn format_full_text(source: &str, text: &str) -> String {
    format!("--- {} ---\n{}", source, text.trim())
}

/// Runs OCR and extraction over images, one at a time.
pub struct BatchProcessor<O> {
    ocr: O,
    preprocessor: ImagePreprocessor,
    extractor: VoucherExtractor,
    language: String,
}

impl<O: OcrBackend> BatchProcessor<O> {
    /// Create a processor with default settings.
    pub fn new(ocr: O) -> Self {
        Self::from_config(ocr, &VrecConfig::default())
    }

    pub fn from_config(ocr: O, config: &VrecConfig) -> Self {
        Self {
            ocr,
            preprocessor: ImagePreprocessor::from_config(&config.ocr.preprocessing),
            extractor: VoucherExtractor::from_config(&config.extraction),
            language: config.ocr.language.clone(),
        }
    }

    /// Set the language hint passed to the OCR backend.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Load, clean up and recognize one image.
    pub fn recognize(&self, source: &ImageSource) -> Result<String> {
        let image = source.load()?;
        let prepared = self.preprocessor.process(&image)?;
        let text = self.ocr.recognize(&prepared, &self.language)?;
        debug!("{}: recognized {} characters", source.name, text.chars().count());
        Ok(text)
    }

    /// Process one image. Failures become a failed record; this never errors.
    pub fn process_one(&self, source: &ImageSource, mode: BatchMode) -> BatchOutput {
        match self.recognize(source) {
            Ok(text) => match mode {
                BatchMode::Full => BatchOutput::Text(format_full_text(&source.name, &text)),
                BatchMode::Code => {
                    BatchOutput::Record(self.extractor.extract_record(&source.name, &text))
                }
            },
            Err(e) => {
                warn!("Failed to process {}: {}", source.name, e);
                BatchOutput::Record(ExtractionRecord::failed(&source.name, e.to_string()))
            }
        }
    }

    /// Process every source in order, reporting progress before each one.
    pub fn run<F>(&self, sources: &[ImageSource], mode: BatchMode, mut on_progress: F) -> Vec<BatchOutput>
    where
        F: FnMut(&Progress),
    {
        let total = sources.len();
        info!("Processing {} image(s) in {:?} mode", total, mode);

        sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                on_progress(&Progress::new(i + 1, total, &source.name));
                self.process_one(source, mode)
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    use image::{DynamicImage, ImageFormat};

    use crate::error::OcrError;
    use crate::ocr::OcrBackend;

    /// OCR backend answering from a fixed script, one entry per call.
    pub struct ScriptedOcr {
        responses: Mutex<VecDeque<Result<String, String>>>,
    }

    impl ScriptedOcr {
        pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl OcrBackend for ScriptedOcr {
        fn recognize(&self, _image: &DynamicImage, _language: &str) -> Result<String, OcrError> {
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(OcrError::Recognition(e)),
                None => Ok(String::new()),
            }
        }
    }

    pub fn png_bytes() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }
}
