use crate::record::LogRecord;
use async_trait::async_trait;
use std::error::Error;

/// Error type used at the client capability boundary.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A single record the backend rejected inside an otherwise accepted
/// bulk request.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    /// Position of the rejected record within the submitted batch.
    pub index: usize,
    /// Backend-provided rejection reason, verbatim.
    pub reason: String,
}

/// Outcome of a bulk submission the backend accepted at the transport
/// level. An empty `failures` list means every record was indexed.
#[derive(Debug, Clone, Default)]
pub struct BulkResponse {
    pub failures: Vec<BulkFailure>,
}

impl BulkResponse {
    /// A response with no per-record failures.
    pub fn ok() -> Self {
        BulkResponse::default()
    }
}

/// Capability to submit write requests to the index backend.
///
/// Implementations own connection setup, request construction and
/// timeouts; processors only borrow the client and never retry on its
/// behalf.
///
/// **Returns**
/// - `Ok(..)` if the backend accepted the request at the transport
///   level. For bulk requests the [`BulkResponse`] may still carry
///   per-record rejections.
/// - `Err(..)` if the request as a whole failed (network error,
///   non-success HTTP status, serialization error). Callers treat this
///   as a recoverable delivery failure.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Submit a single record as one write request.
    async fn submit(&self, record: &LogRecord) -> Result<(), BoxError>;

    /// Submit a batch of records as one bulk write request.
    ///
    /// Default implementation issues one [`submit`](IndexClient::submit)
    /// per record and maps individual errors into per-item failures, for
    /// backends without a native bulk endpoint.
    async fn submit_bulk(&self, records: &[LogRecord]) -> Result<BulkResponse, BoxError> {
        let mut failures = Vec::new();
        for (index, record) in records.iter().enumerate() {
            if let Err(e) = self.submit(record).await {
                failures.push(BulkFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }
        Ok(BulkResponse { failures })
    }
}
