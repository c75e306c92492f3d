use crate::processor::MessageProcessor;
use crate::record::LogRecord;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, warn};

/// Spawn a task that drives a [`MessageProcessor`] through its full
/// lifecycle over a bounded channel.
///
/// The task runs `init` first; if that fails the stage is not started
/// and the task exits after logging the error. Records arriving on the
/// channel are handed to `send` one at a time, a ticker forces a
/// periodic `flush` even when batches stay below the size threshold,
/// and closing the channel (dropping all senders) runs `deinit` so the
/// buffered tail is flushed before the task finishes.
///
/// Retry, backoff and dead-lettering of rejected records stay with the
/// surrounding pipeline; the worker only reports rejections.
pub fn spawn(
    processor: Arc<dyn MessageProcessor>,
    mut records: mpsc::Receiver<LogRecord>,
    flush_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = processor.init().await {
            error!(error = %e, "processor init failed, stage not started");
            return;
        }

        let mut ticker = interval(flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; it lands on an empty
        // buffer and is a no-op.
        ticker.tick().await;

        loop {
            tokio::select! {
                record = records.recv() => {
                    match record {
                        Some(record) => {
                            if !processor.send(record).await {
                                warn!("record rejected by processor");
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    processor.flush().await;
                }
            }
        }

        processor.deinit().await;
        debug!("processor worker stopped");
    })
}
