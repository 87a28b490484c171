#![cfg(not(loom))]
//! Property tests for framing and arithmetic.

use nibbleframe_testing::{ManualClock, RecordingDiagnostics, TestRig, add_request};
use proptest::prelude::*;

fn rig() -> TestRig { TestRig::new(ManualClock::new(), RecordingDiagnostics::default()) }

fn empty_frame() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=15).prop_map(|payload| {
        let len = u8::try_from(payload.len()).expect("payload fits a nibble");
        let mut bytes = vec![0x10 | len];
        bytes.extend(payload);
        bytes
    })
}

proptest! {
    #[test]
    fn add_returns_wrapping_sum(a in any::<u16>(), b in any::<u16>()) {
        let mut rig = rig();
        rig.feed(&add_request(a, b));
        rig.step();
        let sum = a.wrapping_add(b).to_be_bytes();
        prop_assert_eq!(rig.sent(), vec![vec![0x32, sum[0], sum[1]]]);
    }

    #[test]
    fn empty_echoes_any_payload(frame in empty_frame()) {
        let mut rig = rig();
        rig.feed(&frame);
        rig.step();
        prop_assert_eq!(rig.sent(), vec![frame]);
    }

    #[test]
    fn log_never_responds(payload in prop::collection::vec(any::<u8>(), 0..=15)) {
        let mut rig = rig();
        let len = u8::try_from(payload.len()).expect("payload fits a nibble");
        rig.feed(&[0x60 | len]);
        rig.feed(&payload);
        rig.settle();
        prop_assert!(rig.sent().is_empty());
        prop_assert_eq!(rig.stats().frames_received, 1);
        prop_assert_eq!(rig.diagnostics.take().len(), 1);
    }

    #[test]
    fn chunk_boundaries_do_not_change_frames(
        frames in prop::collection::vec(empty_frame(), 1..24),
        chunk in 1usize..32,
    ) {
        let mut rig = rig();
        let stream: Vec<u8> = frames.concat();
        let mut received = Vec::new();
        for piece in stream.chunks(chunk) {
            rig.feed(piece);
            rig.settle();
            received.extend(rig.sent());
        }
        prop_assert_eq!(received, frames);
        prop_assert_eq!(rig.stats().protocol_violations, 0);
    }
}
