use crate::client::{BoxError, BulkFailure, BulkResponse, IndexClient};
use crate::record::LogRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A client that accepts and discards every write.
///
/// Useful for measuring processor overhead without any backend I/O,
/// and for tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopClient;

#[async_trait]
impl IndexClient for NoopClient {
    async fn submit(&self, _record: &LogRecord) -> Result<(), BoxError> {
        Ok(())
    }
}

/// In-memory client that records every submission it sees.
///
/// Two failure modes can be toggled at runtime: `failing` makes every
/// request fail at the transport level, `rejecting` accepts bulk
/// requests but reports a per-record rejection for each item.
#[derive(Default)]
pub struct MemoryClient {
    singles: Mutex<Vec<LogRecord>>,
    bulks: Mutex<Vec<Vec<LogRecord>>>,
    failing: AtomicBool,
    rejecting: AtomicBool,
}

impl MemoryClient {
    pub fn new() -> Self {
        MemoryClient::default()
    }

    /// Make every subsequent request fail at the transport level.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Accept subsequent bulk requests but reject every record in them.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Records received through single-record submissions.
    pub fn singles(&self) -> Vec<LogRecord> {
        self.singles.lock().expect("poisoned lock").clone()
    }

    /// Batches received through bulk submissions, in arrival order.
    pub fn bulks(&self) -> Vec<Vec<LogRecord>> {
        self.bulks.lock().expect("poisoned lock").clone()
    }

    /// Number of bulk requests received.
    pub fn bulk_count(&self) -> usize {
        self.bulks.lock().expect("poisoned lock").len()
    }
}

#[async_trait]
impl IndexClient for MemoryClient {
    async fn submit(&self, record: &LogRecord) -> Result<(), BoxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("memory client set to fail".into());
        }
        self.singles
            .lock()
            .expect("poisoned lock")
            .push(record.clone());
        Ok(())
    }

    async fn submit_bulk(&self, records: &[LogRecord]) -> Result<BulkResponse, BoxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("memory client set to fail".into());
        }
        self.bulks
            .lock()
            .expect("poisoned lock")
            .push(records.to_vec());

        if self.rejecting.load(Ordering::SeqCst) {
            let failures = (0..records.len())
                .map(|index| BulkFailure {
                    index,
                    reason: "memory client set to reject".into(),
                })
                .collect();
            return Ok(BulkResponse { failures });
        }
        Ok(BulkResponse::ok())
    }
}
