use crate::client::IndexClient;
use crate::options::ProcessorOptions;
use crate::processor::{Lifecycle, MessageProcessor, ProcessorError};
use crate::record::LogRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Processor that accumulates records in memory and ships them as bulk
/// requests.
///
/// `send` appends to the batch and returns `true` right away: the
/// boolean means *accepted into the buffer*, never *persisted*. Once
/// the batch reaches `options.batch_size`, `send` flushes it as one
/// bulk request. An explicit [`flush`](MessageProcessor::flush) submits
/// whatever is buffered regardless of thresholds.
///
/// The batch is cleared only after the backend confirmed the request;
/// a transport-level failure retains it for the next flush attempt.
/// While the backend is down the buffer is bounded by
/// `options.max_pending` — beyond that, records are rejected and
/// counted as dropped rather than buffered without limit.
///
/// All operations serialize on the internal buffer lock, so one
/// instance can be shared between a worker and a flush timer.
pub struct BulkProcessor {
    options: Arc<ProcessorOptions>,
    client: Arc<dyn IndexClient>,
    lifecycle: Lifecycle,
    buffer: Mutex<Vec<LogRecord>>,
    accepted: AtomicU64,
    submitted: AtomicU64,
    dropped: AtomicU64,
    failed_records: AtomicU64,
    failed_flushes: AtomicU64,
}

impl BulkProcessor {
    pub fn new(options: Arc<ProcessorOptions>, client: Arc<dyn IndexClient>) -> Self {
        BulkProcessor {
            options,
            client,
            lifecycle: Lifecycle::new(),
            buffer: Mutex::new(Vec::new()),
            accepted: AtomicU64::new(0),
            submitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed_records: AtomicU64::new(0),
            failed_flushes: AtomicU64::new(0),
        }
    }

    /// Records accepted into the buffer so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Records handed to the backend in confirmed bulk requests.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Records rejected on `send` (buffer full) or lost at shutdown.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Records the backend rejected inside confirmed bulk requests.
    pub fn failed_records(&self) -> u64 {
        self.failed_records.load(Ordering::Relaxed)
    }

    /// Bulk requests that failed at the transport level.
    pub fn failed_flushes(&self) -> u64 {
        self.failed_flushes.load(Ordering::Relaxed)
    }

    /// Records currently buffered and not yet confirmed by the backend.
    pub async fn pending(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Submit the buffered batch. Caller holds the buffer lock, which
    /// keeps send-triggered and timer-triggered flushes mutually
    /// exclusive.
    async fn flush_buffer(&self, buffer: &mut Vec<LogRecord>) {
        if buffer.is_empty() {
            return;
        }

        match self.client.submit_bulk(buffer).await {
            Ok(response) => {
                self.submitted
                    .fetch_add(buffer.len() as u64, Ordering::Relaxed);
                for failure in &response.failures {
                    self.failed_records.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        record = failure.index,
                        reason = %failure.reason,
                        "backend rejected record in bulk request"
                    );
                }
                buffer.clear();
            }
            Err(e) => {
                self.failed_flushes.fetch_add(1, Ordering::Relaxed);
                warn!(
                    batch_size = buffer.len(),
                    error = %e,
                    "bulk submission failed, batch retained"
                );
            }
        }
    }
}

#[async_trait]
impl MessageProcessor for BulkProcessor {
    async fn init(&self) -> Result<(), ProcessorError> {
        if self.options.batch_size == 0 {
            return Err(ProcessorError::InvalidOptions(
                "batch_size must be at least 1".into(),
            ));
        }
        if self.options.max_pending < self.options.batch_size {
            return Err(ProcessorError::InvalidOptions(format!(
                "max_pending ({}) must be at least batch_size ({})",
                self.options.max_pending, self.options.batch_size
            )));
        }

        self.buffer.lock().await.reserve(self.options.batch_size);
        self.lifecycle.open();
        Ok(())
    }

    async fn send(&self, record: LogRecord) -> bool {
        self.lifecycle.assert_ready("send");

        let mut buffer = self.buffer.lock().await;
        if buffer.len() >= self.options.max_pending {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                record_target = %record.target,
                max_pending = self.options.max_pending,
                "buffer full, rejecting record"
            );
            return false;
        }

        buffer.push(record);
        self.accepted.fetch_add(1, Ordering::Relaxed);

        if buffer.len() >= self.options.batch_size {
            self.flush_buffer(&mut buffer).await;
        }
        // Accepted even if a threshold flush just failed; the batch is
        // retained and retried on a later flush.
        true
    }

    async fn flush(&self) {
        let mut buffer = self.buffer.lock().await;
        self.flush_buffer(&mut buffer).await;
    }

    async fn deinit(&self) {
        if !self.lifecycle.close() {
            return;
        }

        let mut buffer = self.buffer.lock().await;
        self.flush_buffer(&mut buffer).await;
        if !buffer.is_empty() {
            // Cooperative cancellation: one final attempt, then drop
            // with a trace of how much was lost.
            let lost = buffer.len();
            self.dropped.fetch_add(lost as u64, Ordering::Relaxed);
            error!(records = lost, "shutdown flush failed, dropping buffered records");
            buffer.clear();
        }
    }
}
