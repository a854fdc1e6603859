//! Background batch worker with restartable task handle.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, VrecError};
use crate::models::record::ExtractionRecord;
use crate::ocr::OcrBackend;

use super::{BatchOutput, BatchProcessor, BatchRequest, Progress, WorkerMessage};

/// Owns at most one running batch.
///
/// Starting a batch aborts the one in flight, if any, and drops its channel
/// before the new task is spawned, so one handle never runs two batches.
/// Images are processed one at a time on the blocking pool. An image still
/// running after its batch was aborted keeps the single OCR permit until it
/// returns, and the next batch waits for it.
/// Must be used from within a Tokio runtime.
pub struct BatchWorker<O: OcrBackend + 'static> {
    processor: Arc<BatchProcessor<O>>,
    ocr_permit: Arc<Semaphore>,
    task: Option<JoinHandle<()>>,
}

impl<O: OcrBackend + 'static> BatchWorker<O> {
    pub fn new(processor: BatchProcessor<O>) -> Self {
        Self {
            processor: Arc::new(processor),
            ocr_permit: Arc::new(Semaphore::new(1)),
            task: None,
        }
    }

    /// Start a batch, replacing any batch still running.
    ///
    /// The receiver yields zero or more `Progress` messages followed by one
    /// `Done`. It closes without `Done` if the batch is replaced or cancelled.
    pub fn start(&mut self, request: BatchRequest) -> UnboundedReceiver<WorkerMessage> {
        self.cancel();

        let (tx, rx) = mpsc::unbounded_channel();
        let processor = Arc::clone(&self.processor);
        let permit = Arc::clone(&self.ocr_permit);
        self.task = Some(tokio::spawn(run_batch(processor, permit, request, tx)));
        rx
    }

    /// Abort the running batch, if any. An image already executing on the
    /// blocking pool finishes while holding the OCR permit, and its result is
    /// discarded.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                info!("Discarding in-flight batch");
            }
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<O: OcrBackend + 'static> Drop for BatchWorker<O> {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_batch<O: OcrBackend + 'static>(
    processor: Arc<BatchProcessor<O>>,
    ocr_permit: Arc<Semaphore>,
    request: BatchRequest,
    tx: UnboundedSender<WorkerMessage>,
) {
    let BatchRequest { sources, mode } = request;
    let total = sources.len();
    let mut results = Vec::with_capacity(total);

    for (i, source) in sources.into_iter().enumerate() {
        // A closed receiver only means nobody is watching progress
        let _ = tx.send(WorkerMessage::Progress(Progress::new(i + 1, total, &source.name)));

        let permit = match Arc::clone(&ocr_permit).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!("OCR permit unavailable: {}", e);
                return;
            }
        };

        let name = source.name.clone();
        let processor = Arc::clone(&processor);
        let blocking = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            processor.process_one(&source, mode)
        });
        let output = match blocking.await {
            Ok(output) => output,
            Err(e) => {
                warn!("Worker failed on {}: {}", name, e);
                BatchOutput::Record(ExtractionRecord::failed(name, format!("worker task failed: {}", e)))
            }
        };
        results.push(output);
    }

    debug!("Batch of {} finished", total);
    let _ = tx.send(WorkerMessage::Done { results });
}

/// Drain a worker channel, passing progress to `on_progress`, and return the
/// final results.
pub async fn wait_for_results<F>(
    mut rx: UnboundedReceiver<WorkerMessage>,
    mut on_progress: F,
) -> Result<Vec<BatchOutput>>
where
    F: FnMut(&Progress),
{
    while let Some(message) = rx.recv().await {
        match message {
            WorkerMessage::Progress(progress) => on_progress(&progress),
            WorkerMessage::Done { results } => return Ok(results),
        }
    }

    Err(VrecError::Worker("batch stopped before completion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{png_bytes, ScriptedOcr};
    use super::super::{BatchMode, ImageSource};
    use super::*;
    use crate::error::OcrError;
    use crate::models::record::AmountField;
    use image::DynamicImage;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(names: &[&str]) -> BatchRequest {
        BatchRequest {
            sources: names
                .iter()
                .map(|name| ImageSource::memory(*name, png_bytes()))
                .collect(),
            mode: BatchMode::Code,
        }
    }

    #[tokio::test]
    async fn test_worker_reports_progress_then_done() {
        let ocr = ScriptedOcr::new(vec![
            Ok("ABCD1234EFGH5678 /\n1,500円"),
            Err("timeout"),
        ]);
        let mut worker = BatchWorker::new(BatchProcessor::new(ocr));

        let rx = worker.start(request(&["a.jpg", "b.jpg"]));
        let mut progress = Vec::new();
        let results = wait_for_results(rx, |p| progress.push(p.index)).await.unwrap();

        assert_eq!(progress, vec![1, 2]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_record().unwrap().source, "a.jpg");
        assert_eq!(results[1].as_record().unwrap().amount, AmountField::Failed);
    }

    #[tokio::test]
    async fn test_restart_discards_previous_batch() {
        let ocr = ScriptedOcr::new(vec![Ok("SECOND1234567890 / 500円")]);
        let mut worker = BatchWorker::new(BatchProcessor::new(ocr));

        let mut first = worker.start(request(&["old-1.jpg", "old-2.jpg"]));
        let second = worker.start(request(&["new.jpg"]));

        assert_eq!(first.recv().await, None);

        let results = wait_for_results(second, |_| {}).await.unwrap();
        assert_eq!(results.len(), 1);
        let record = results[0].as_record().unwrap();
        assert_eq!(record.source, "new.jpg");
        assert_eq!(record.code.as_ref().map(|c| c.as_str()), Some("SECOND1234567890"));
    }

    /// Backend that sleeps inside `recognize` and records peak concurrency.
    struct SlowOcr {
        delay: Duration,
        calls: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowOcr {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl OcrBackend for SlowOcr {
        fn recognize(&self, _image: &DynamicImage, _language: &str) -> std::result::Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("CODE1234567890AB / 500円".to_string())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_waits_for_in_flight_ocr() {
        let ocr = Arc::new(SlowOcr::new(Duration::from_millis(300)));
        let mut worker = BatchWorker::new(BatchProcessor::new(Arc::clone(&ocr)));

        let first = worker.start(request(&["old.jpg"]));
        while ocr.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = worker.start(request(&["new.jpg"]));
        let results = wait_for_results(second, |_| {}).await.unwrap();
        drop(first);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_record().unwrap().source, "new.jpg");
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ocr.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_closes_channel() {
        let mut worker = BatchWorker::new(BatchProcessor::new(ScriptedOcr::new(vec![])));
        let rx = worker.start(request(&["a.jpg"]));
        assert!(worker.is_running());
        worker.cancel();
        assert!(!worker.is_running());

        let result = wait_for_results(rx, |_| {}).await;
        assert!(matches!(result, Err(VrecError::Worker(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_is_done_immediately() {
        let mut worker = BatchWorker::new(BatchProcessor::new(ScriptedOcr::new(vec![])));
        let rx = worker.start(request(&[]));

        let results = wait_for_results(rx, |_| panic!("no progress expected")).await.unwrap();
        assert!(results.is_empty());
    }
}
