use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::record::LogRecord;

/// Error raised during processor setup. Fatal to the instance: the
/// pipeline must not start the stage.
#[derive(thiserror::Error, Debug)]
pub enum ProcessorError {
    #[error("invalid processor options: {0}")]
    InvalidOptions(String),
}

/// Uniform lifecycle and delivery contract for message processors.
///
/// A processor accepts one [`LogRecord`] at a time from a pipeline
/// worker and turns it into index-backend writes, either immediately or
/// through an internal batch. Variants differ only in how `send` maps a
/// record onto backend requests; lifecycle and error semantics are the
/// same for all of them.
///
/// Ordinary delivery failures never cross this boundary as errors: they
/// are signaled through `send`'s boolean result and reported through
/// `tracing`, so the caller can keep processing subsequent records and
/// apply its own retry or dead-letter policy. Only programmer misuse
/// (calling `send` before `init` or after `deinit`) is fatal.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    /// Prepare internal state: validate options, allocate buffers.
    ///
    /// Called once before any `send`. Failure here means the stage must
    /// not start.
    async fn init(&self) -> Result<(), ProcessorError> {
        Ok(())
    }

    /// Hand one record to the processor for delivery.
    ///
    /// **Returns**
    /// - `true` if the record was accepted for delivery. For batching
    ///   processors this means accepted into the buffer, not yet
    ///   persisted.
    /// - `false` on any recoverable delivery failure (backend rejected
    ///   the write, transient I/O failure, buffer full). The processor
    ///   does not retry internally.
    async fn send(&self, record: LogRecord) -> bool;

    /// Force any buffered records out to the backend now, regardless of
    /// batch-size or time thresholds.
    ///
    /// Safe to call repeatedly and on an empty buffer (no-op). Flush is
    /// typically driven by a timer or shutdown hook with no caller to
    /// hand a result to, so delivery failures are reported through
    /// `tracing` instead of a return value.
    async fn flush(&self) {}

    /// Release internal state. Implicitly a final `flush` for batching
    /// processors so shutdown cannot silently lose records. Idempotent.
    async fn deinit(&self) {
        self.flush().await;
    }
}

const STATE_NEW: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Shared lifecycle-state cell the concrete processors delegate to.
///
/// Misuse checks must never block, so the state lives in an atomic
/// rather than under the buffer lock.
pub(crate) struct Lifecycle(AtomicU8);

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Lifecycle(AtomicU8::new(STATE_NEW))
    }

    pub(crate) fn open(&self) {
        self.0.store(STATE_READY, Ordering::Release);
    }

    /// Panics on use before `init` or after `deinit`; both signal an
    /// integration bug in the calling pipeline.
    pub(crate) fn assert_ready(&self, op: &str) {
        match self.0.load(Ordering::Acquire) {
            STATE_READY => {}
            STATE_NEW => panic!("{op} called before init"),
            _ => panic!("{op} called after deinit"),
        }
    }

    /// Transition to closed. Returns `true` only on the first close of
    /// a ready instance, so teardown work runs exactly once.
    pub(crate) fn close(&self) -> bool {
        self.0.swap(STATE_CLOSED, Ordering::AcqRel) == STATE_READY
    }
}
