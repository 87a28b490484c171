//! Unit tests for the byte intake channel.

use std::{collections::VecDeque, num::NonZeroUsize};

use rstest::{fixture, rstest};
use tokio::time::{self, Duration};

use super::{ByteSource, IntakeError, IntakeProducer, IntakeQueue, intake_channel};

#[fixture]
fn small_intake() -> (IntakeProducer, IntakeQueue) {
    intake_channel(NonZeroUsize::new(3).expect("non-zero capacity"))
}

#[rstest]
fn reads_only_available_bytes(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, mut queue) = small_intake;
    producer.push_from_isr(1).expect("room for byte");
    producer.push_from_isr(2).expect("room for byte");

    let mut buf = [0u8; 8];
    assert_eq!(queue.try_read(&mut buf), 2);
    assert_eq!(&buf[..2], &[1, 2]);
    assert_eq!(queue.try_read(&mut buf), 0, "empty queue must not wait");
}

#[rstest]
fn read_is_bounded_by_buffer(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, mut queue) = small_intake;
    for byte in 1..=3 {
        producer.push_from_isr(byte).expect("room for byte");
    }
    let mut one = [0u8; 1];
    assert_eq!(queue.try_read(&mut one), 1);
    assert_eq!(one, [1]);
    let mut rest = [0u8; 4];
    assert_eq!(queue.try_read(&mut rest), 2);
    assert_eq!(&rest[..2], &[2, 3]);
}

#[rstest]
fn overflow_is_counted_and_reported(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, queue) = small_intake;
    for byte in 0..3 {
        producer.push_from_isr(byte).expect("room for byte");
    }
    assert_eq!(producer.push_from_isr(9), Err(IntakeError::Full));
    assert_eq!(producer.push_from_isr(10), Err(IntakeError::Full));
    assert_eq!(producer.dropped(), 2);
    assert_eq!(queue.dropped(), 2, "both halves share the drop counter");
}

#[rstest]
fn push_after_consumer_drop_reports_closed(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, queue) = small_intake;
    drop(queue);
    assert_eq!(producer.push_from_isr(1), Err(IntakeError::Closed));
    assert_eq!(producer.dropped(), 0);
}

#[rstest]
#[tokio::test]
async fn readable_keeps_the_byte_it_waited_for(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, mut queue) = small_intake;
    producer.push_from_isr(0x42).expect("room for byte");
    producer.push_from_isr(0x43).expect("room for byte");

    assert!(queue.readable().await);
    let mut buf = [0u8; 4];
    assert_eq!(queue.try_read(&mut buf), 2);
    assert_eq!(&buf[..2], &[0x42, 0x43]);
}

#[rstest]
#[tokio::test]
async fn readable_reports_closed_after_drain(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, mut queue) = small_intake;
    producer.push_from_isr(7).expect("room for byte");
    drop(producer);

    assert!(queue.readable().await);
    assert!(!queue.is_closed());
    let mut buf = [0u8; 2];
    assert_eq!(queue.try_read(&mut buf), 1);
    assert!(!queue.readable().await);
    assert!(queue.is_closed());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn readable_pends_while_producers_are_alive(small_intake: (IntakeProducer, IntakeQueue)) {
    let (producer, mut queue) = small_intake;
    let waited = time::timeout(Duration::from_millis(1), queue.readable()).await;
    assert!(waited.is_err(), "readable resolved with no bytes queued");

    producer.push_from_isr(0x42).expect("queue has room");
    assert!(queue.readable().await);
    let mut buf = [0u8; 1];
    assert_eq!(queue.try_read(&mut buf), 1);
    assert_eq!(buf, [0x42]);
}

#[test]
fn deque_source_drains_front_first() {
    let mut source: VecDeque<u8> = [5, 6, 7].into_iter().collect();
    let mut buf = [0u8; 2];
    assert_eq!(source.try_read(&mut buf), 2);
    assert_eq!(buf, [5, 6]);
    assert_eq!(source.try_read(&mut buf), 1);
    assert_eq!(buf[0], 7);
    assert_eq!(source.try_read(&mut buf), 0);
}
