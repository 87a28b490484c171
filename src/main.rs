//! Emulator binary for the `nibbleframe` processing loop.
//!
//! Pushes each request into the intake one byte per gap, as a UART receive
//! interrupt would, then waits for the response the command implies and
//! prints it with the observed latency.

mod cli;

use clap::Parser;
use nibbleframe::{CommandType, Frame, IntakeProducer, OutboundQueue, Processor};
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

fn default_script() -> Vec<Vec<u8>> {
    vec![
        vec![0x10],
        vec![0x24, 0x12, 0x34, 0x11, 0x11],
        vec![0x43, 0x01, 0xF4, 0x5A],
        [&[0x6B][..], b"Hello World"].concat(),
    ]
}

/// Whether a request is answered by exactly one frame.
fn expects_response(request: &Frame) -> bool {
    matches!(
        request.command(),
        Ok(CommandType::Empty | CommandType::Add | CommandType::Delay)
    )
}

async fn send_request(producer: &IntakeProducer, request: &Frame, byte_gap: Duration) {
    let bytes = request.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        if let Err(error) = producer.push_from_isr(byte) {
            warn!(%error, byte, "byte not delivered");
        }
        if i + 1 < bytes.len() {
            time::sleep(byte_gap).await;
        }
    }
}

async fn exchange(
    producer: &IntakeProducer,
    outbound: &mut OutboundQueue,
    request: &Frame,
    cli: &cli::Cli,
) {
    send_request(producer, request, Duration::from_millis(cli.byte_gap_ms)).await;
    if !expects_response(request) {
        println!("request  {request:?} (no response expected)");
        return;
    }
    let start = Instant::now();
    match time::timeout(Duration::from_millis(cli.response_timeout_ms), outbound.recv()).await {
        Ok(Some(response)) => println!(
            "request  {request:?}\nresponse {response:?} after {} ms",
            start.elapsed().as_millis()
        ),
        Ok(None) => println!("request  {request:?}: processing loop stopped"),
        Err(_) => println!("request  {request:?}: response timeout"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();

    #[cfg(feature = "metrics")]
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
    }

    let requests = if cli.frames.is_empty() {
        default_script()
    } else {
        cli.frames.clone()
    }
    .iter()
    .map(|bytes| Frame::from_bytes(bytes))
    .collect::<Result<Vec<_>, _>>()?;

    let (processor, producer, mut outbound) = Processor::builder()
        .intake_capacity(cli.intake_capacity)
        .outbound_capacity(cli.outbound_capacity)
        .tick(Duration::from_millis(cli.tick_ms))
        .build()?;

    let shutdown = CancellationToken::new();
    let loop_task = tokio::spawn(processor.run(shutdown.clone()));
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    for _ in 0..cli.rounds {
        for request in &requests {
            if shutdown.is_cancelled() {
                break;
            }
            exchange(&producer, &mut outbound, request, &cli).await;
        }
    }

    shutdown.cancel();
    let stats = loop_task.await?;
    println!("{stats:#?}");
    Ok(())
}
