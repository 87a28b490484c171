#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for the intake queue using loom.
//!
//! Two producers race for a single free slot. Whatever the interleaving,
//! every byte is either queued or counted as dropped.

use std::num::NonZeroUsize;

use loom::{model, thread};
use nibbleframe::{ByteSource, IntakeError, intake_channel};

#[test]
fn concurrent_producers_account_for_every_byte() {
    model(|| {
        let capacity = NonZeroUsize::new(2).expect("non-zero");
        let (producer, mut queue) = intake_channel(capacity);
        producer.push_from_isr(0).expect("initial push should succeed");

        let p1 = producer.clone();
        let p2 = producer.clone();
        let t1 = thread::spawn(move || p1.push_from_isr(1));
        let t2 = thread::spawn(move || p2.push_from_isr(2));

        let r1 = t1.join().expect("first producer panicked");
        let r2 = t2.join().expect("second producer panicked");
        let results = [r1, r2];
        assert!(
            results
                .iter()
                .all(|r| matches!(r, Ok(()) | Err(IntakeError::Full)))
        );
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let dropped = results.iter().filter(|r| r.is_err()).count();

        let mut buf = [0u8; 4];
        let read = queue.try_read(&mut buf);
        assert_eq!(read, 1 + accepted);
        assert_eq!(buf[0], 0);
        assert_eq!(producer.dropped(), u64::try_from(dropped).expect("small count"));
    });
}
