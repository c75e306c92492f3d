use std::time::Duration;

/// Immutable configuration shared by every processor instance of a
/// pipeline. Created once at pipeline configuration time and handed to
/// processors behind an `Arc`; processors only read it.
///
/// **Fields**
/// - `batch_size`: number of buffered records that triggers an implicit
///   flush in batching processors.
/// - `max_pending`: upper bound on the in-memory buffer. Once reached,
///   further records are rejected instead of growing the buffer while
///   the backend is unavailable.
/// - `flush_interval`: maximum interval between periodic flushes even
///   when the batch is not full. Consumed by the worker driving the
///   processor, not by the processor itself.
#[derive(Clone, Debug)]
pub struct ProcessorOptions {
    pub batch_size: usize,
    pub max_pending: usize,
    pub flush_interval: Duration,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            batch_size: 128,
            max_pending: 8192,
            flush_interval: Duration::from_secs(1),
        }
    }
}
