use crate::client::IndexClient;
use crate::processor::{Lifecycle, MessageProcessor, ProcessorError};
use crate::record::LogRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Processor that submits every record to the backend immediately.
///
/// `send` returns the backend's verdict for that one record, so callers
/// that need per-record delivery confirmation use this variant instead
/// of [`BulkProcessor`](crate::bulk::BulkProcessor).
pub struct SingleProcessor {
    client: Arc<dyn IndexClient>,
    lifecycle: Lifecycle,
}

impl SingleProcessor {
    pub fn new(client: Arc<dyn IndexClient>) -> Self {
        SingleProcessor {
            client,
            lifecycle: Lifecycle::new(),
        }
    }
}

#[async_trait]
impl MessageProcessor for SingleProcessor {
    async fn init(&self) -> Result<(), ProcessorError> {
        self.lifecycle.open();
        Ok(())
    }

    async fn send(&self, record: LogRecord) -> bool {
        self.lifecycle.assert_ready("send");
        match self.client.submit(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    record_target = %record.target,
                    record_timestamp = %record.timestamp,
                    error = %e,
                    "failed to index record"
                );
                false
            }
        }
    }

    async fn deinit(&self) {
        self.lifecycle.close();
    }
}
