use log_index_sink::bulk::BulkProcessor;
use log_index_sink::memory::MemoryClient;
use log_index_sink::options::ProcessorOptions;
use log_index_sink::record::LogRecord;
use log_index_sink::worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn make_record(target: &str) -> LogRecord {
    LogRecord::new("ERROR", target).with_message("integration")
}

#[tokio::test]
async fn closing_the_channel_flushes_the_tail_and_tears_down() {
    let client = Arc::new(MemoryClient::new());
    let options = Arc::new(ProcessorOptions {
        batch_size: 10,
        max_pending: 100,
        flush_interval: Duration::from_secs(3600),
    });
    let processor = Arc::new(BulkProcessor::new(options, client.clone()));

    let (tx, rx) = mpsc::channel(16);
    let handle = worker::spawn(processor.clone(), rx, Duration::from_secs(3600));

    for i in 0..3 {
        tx.send(make_record(&format!("record-{i}"))).await.unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    assert_eq!(client.bulk_count(), 1);
    assert_eq!(client.bulks()[0].len(), 3);
    assert_eq!(processor.accepted(), 3);
    assert_eq!(processor.submitted(), 3);
    assert_eq!(processor.dropped(), 0);
}

#[tokio::test]
async fn threshold_flushes_happen_while_the_worker_runs() {
    let client = Arc::new(MemoryClient::new());
    let options = Arc::new(ProcessorOptions {
        batch_size: 2,
        max_pending: 100,
        flush_interval: Duration::from_secs(3600),
    });
    let processor = Arc::new(BulkProcessor::new(options, client.clone()));

    let (tx, rx) = mpsc::channel(16);
    let handle = worker::spawn(processor.clone(), rx, Duration::from_secs(3600));

    for i in 0..5 {
        tx.send(make_record(&format!("record-{i}"))).await.unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    // Two full batches from the size threshold, one record from the
    // shutdown flush.
    assert_eq!(client.bulk_count(), 3);
    assert_eq!(client.bulks()[0].len(), 2);
    assert_eq!(client.bulks()[1].len(), 2);
    assert_eq!(client.bulks()[2].len(), 1);
}

#[tokio::test]
async fn backend_outage_is_survived_without_losing_accepted_records() {
    let client = Arc::new(MemoryClient::new());
    let options = Arc::new(ProcessorOptions {
        batch_size: 2,
        max_pending: 100,
        flush_interval: Duration::from_secs(3600),
    });
    let processor = Arc::new(BulkProcessor::new(options, client.clone()));

    let (tx, rx) = mpsc::channel(16);
    let handle = worker::spawn(processor.clone(), rx, Duration::from_secs(3600));

    client.set_failing(true);
    tx.send(make_record("a")).await.unwrap();
    tx.send(make_record("b")).await.unwrap();

    // Wait until the failed threshold flush is visible, then recover.
    while processor.failed_flushes() == 0 {
        tokio::task::yield_now().await;
    }
    client.set_failing(false);

    drop(tx);
    handle.await.unwrap();

    assert_eq!(client.bulk_count(), 1);
    assert_eq!(client.bulks()[0].len(), 2);
    assert_eq!(processor.dropped(), 0);
}
