#![cfg(not(loom))]
//! End-to-end tests for [`Processor::run`] on paused Tokio time.
//!
//! Each test spawns the loop with the default [`TokioClock`], feeds bytes
//! through the producer and observes the outbound queue.

use nibbleframe::{
    IntakeProducer,
    OutboundQueue,
    Processor,
    ProcessorStats,
};
use nibbleframe_testing::{
    RecordingDiagnostics,
    add_request,
    delay_request,
    log_request,
    recv_expect,
};
use rstest::rstest;
use tokio::{
    task::JoinHandle,
    time::{self, Duration, Instant},
};
use tokio_util::sync::CancellationToken;

struct Running {
    producer: IntakeProducer,
    outbound: OutboundQueue,
    shutdown: CancellationToken,
    task: JoinHandle<ProcessorStats>,
    diagnostics: RecordingDiagnostics,
}

impl Running {
    fn feed(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.producer.push_from_isr(byte).expect("intake has room");
        }
    }

    async fn next(&mut self) -> Vec<u8> {
        let frame = recv_expect!(
            async { self.outbound.recv().await.ok_or("outbound closed") },
            "response"
        );
        frame.as_bytes().to_vec()
    }

    async fn stop(self) -> (ProcessorStats, OutboundQueue) {
        self.shutdown.cancel();
        let stats = self.task.await.expect("processor task panicked");
        (stats, self.outbound)
    }
}

fn spawn_processor() -> Running {
    let diagnostics = RecordingDiagnostics::default();
    let (processor, producer, outbound) = Processor::builder()
        .outbound_capacity(32)
        .diagnostics(diagnostics.clone())
        .build()
        .expect("valid configuration");
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(processor.run(shutdown.clone()));
    Running {
        producer,
        outbound,
        shutdown,
        task,
        diagnostics,
    }
}

#[rstest]
#[case::empty(vec![0x10], vec![0x10])]
#[case::empty_with_payload(vec![0x13, 0xAA, 0xBB, 0xCC], vec![0x13, 0xAA, 0xBB, 0xCC])]
#[case::add(add_request(2, 3), vec![0x32, 0x00, 0x05])]
#[case::add_wraps(add_request(0xFFFF, 0x0002), vec![0x32, 0x00, 0x01])]
#[tokio::test(start_paused = true)]
async fn immediate_responses(#[case] request: Vec<u8>, #[case] expected: Vec<u8>) {
    let mut running = spawn_processor();
    running.feed(&request);
    assert_eq!(running.next().await, expected);
    let (stats, _) = running.stop().await;
    assert_eq!(stats.frames_received, 1);
    assert_eq!(stats.responses_sent, 1);
}

#[tokio::test(start_paused = true)]
async fn delay_answers_after_requested_ticks() {
    let mut running = spawn_processor();
    let start = Instant::now();
    running.feed(&delay_request(500, 0x5A));

    assert_eq!(running.next().await, vec![0x51, 0x5A]);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(500), "fired early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(502), "fired late: {elapsed:?}");

    let (stats, _) = running.stop().await;
    assert_eq!(stats.timeouts_fired, 1);
}

#[tokio::test(start_paused = true)]
async fn ninth_delay_is_rejected_while_table_is_full() {
    let mut running = spawn_processor();
    for payload in 0..9u8 {
        running.feed(&delay_request(10, payload));
    }

    let mut fired = Vec::new();
    for _ in 0..8 {
        fired.push(running.next().await);
    }
    fired.sort();
    let expected: Vec<Vec<u8>> = (0..8u8).map(|p| vec![0x51, p]).collect();
    assert_eq!(fired, expected);

    time::sleep(Duration::from_secs(1)).await;
    let (stats, mut outbound) = running.stop().await;
    assert!(outbound.try_recv().is_none(), "ninth delay must never fire");
    assert_eq!(stats.timeouts_fired, 8);
    assert_eq!(stats.delays_rejected, 1);
}

#[tokio::test(start_paused = true)]
async fn log_writes_diagnostics_without_response() {
    let mut running = spawn_processor();
    running.feed(&log_request("Hello World"));
    running.feed(&[0x10]);

    assert_eq!(running.next().await, vec![0x10], "only the EMPTY answers");
    assert_eq!(running.diagnostics.take(), vec!["Log: Hello World".to_owned()]);
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_command_is_skipped_and_stream_resyncs() {
    let mut running = spawn_processor();
    running.feed(&[0x92, 0x01, 0x02]);
    running.feed(&[0x31, 0x00]);
    running.feed(&add_request(1, 1));

    assert_eq!(running.next().await, vec![0x32, 0x00, 0x02]);
    let lines = running.diagnostics.take();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with("rejected: ")));

    let (stats, _) = running.stop().await;
    assert_eq!(stats.frames_received, 3);
    assert_eq!(stats.protocol_violations, 2);
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_while_a_frame_is_half_received() {
    let mut running = spawn_processor();
    let start = Instant::now();
    running.feed(&delay_request(5, 0x77));
    let add = add_request(0x0100, 0x0001);
    running.feed(&add[..2]);

    assert_eq!(running.next().await, vec![0x51, 0x77]);
    assert!(start.elapsed() >= Duration::from_millis(5));

    for &byte in &add[2..] {
        time::sleep(Duration::from_millis(3)).await;
        running.feed(&[byte]);
    }
    assert_eq!(running.next().await, vec![0x32, 0x01, 0x01]);
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn byte_gaps_do_not_split_frames() {
    let mut running = spawn_processor();
    for byte in add_request(40, 2) {
        time::sleep(Duration::from_millis(20)).await;
        running.feed(&[byte]);
    }
    assert_eq!(running.next().await, vec![0x32, 0x00, 0x2A]);
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_returns_statistics() {
    let running = spawn_processor();
    running.feed(&[0x10, 0x10]);
    running.feed(&delay_request(1_000, 0x01));
    time::sleep(Duration::from_millis(10)).await;

    let (stats, mut outbound) = running.stop().await;
    assert_eq!(stats.frames_received, 3);
    assert_eq!(stats.responses_sent, 2);
    assert_eq!(stats.timeouts_fired, 0);
    assert_eq!(outbound.drain().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn loop_ends_once_intake_closes_and_timeouts_drain() {
    let Running {
        producer,
        mut outbound,
        shutdown: _shutdown,
        task,
        ..
    } = spawn_processor();
    for byte in delay_request(50, 0x33) {
        producer.push_from_isr(byte).expect("intake has room");
    }
    drop(producer);

    let stats = task.await.expect("processor task panicked");
    assert_eq!(stats.timeouts_fired, 1);
    let frame = outbound.recv().await.expect("timeout queued before exit");
    assert_eq!(frame.as_bytes(), &[0x51, 0x33]);
    assert!(outbound.recv().await.is_none());
}
