//! Tests for the shared processor rig.

use nibbleframe_testing::{ManualClock, RecordingDiagnostics, TestRig, add_request, delay_request, log_request};

#[test]
fn request_encoders_match_wire_layout() {
    assert_eq!(add_request(0x0102, 0x0304), vec![0x24, 0x01, 0x02, 0x03, 0x04]);
    assert_eq!(delay_request(500, 0x5A), vec![0x43, 0x01, 0xF4, 0x5A]);
    assert_eq!(log_request("hi"), vec![0x62, b'h', b'i']);
}

#[test]
fn settle_processes_every_queued_frame() {
    let mut rig = TestRig::new(ManualClock::new(), RecordingDiagnostics::default());
    rig.feed(&[0x10, 0x10, 0x10]);
    rig.settle();
    assert_eq!(rig.sent().len(), 3);
    assert_eq!(rig.stats().frames_received, 3);
}
