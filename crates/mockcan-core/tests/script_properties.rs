//! Property tests for script consumption.
//!
//! These verify ordering and cursor behaviour for arbitrary scripts, not just
//! hand-picked scenarios.

use mockcan_core::{CanFrame, ErrorKind, MockConfig, MockDevice, ScriptEntry};
use proptest::prelude::*;

/// Strategy for generating frames with base or extended identifiers.
fn arbitrary_frame() -> impl Strategy<Value = CanFrame> {
    (
        prop_oneof![0u32..=0x7FF, 0x800u32..=0x1FFF_FFFF],
        prop::collection::vec(any::<u8>(), 0..=8),
    )
        .prop_map(|(id, payload)| CanFrame::new(id, payload).expect("strategy yields valid frames"))
}

fn arbitrary_error_kind() -> impl Strategy<Value = ErrorKind> {
    prop_oneof![
        Just(ErrorKind::Read),
        Just(ErrorKind::Write),
        Just(ErrorKind::Connection),
        Just(ErrorKind::Configuration),
        Just(ErrorKind::Operation),
        Just(ErrorKind::Timeout),
        Just(ErrorKind::Unknown),
    ]
}

/// Strategy for generating script entries, weighted towards frames.
fn arbitrary_entry() -> impl Strategy<Value = ScriptEntry> {
    prop_oneof![
        4 => arbitrary_frame().prop_map(ScriptEntry::Outgoing),
        3 => arbitrary_frame().prop_map(ScriptEntry::Incoming),
        2 => arbitrary_frame().prop_map(ScriptEntry::OwnIncoming),
        1 => (arbitrary_error_kind(), "[a-z ]{0,12}")
            .prop_map(|(kind, description)| ScriptEntry::device_error(kind, description)),
    ]
}

fn arbitrary_script() -> impl Strategy<Value = Vec<ScriptEntry>> {
    prop::collection::vec(arbitrary_entry(), 0..40)
}

/// Send every expected outgoing frame in script order.
fn play_script(device: &mut MockDevice, script: &[ScriptEntry]) {
    for entry in script {
        if let ScriptEntry::Outgoing(frame) = entry {
            device.send(frame.clone()).expect("send never fails with default policy");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A faithful device consumes the whole script in order.
    ///
    /// With own-frame reception enabled the actual-I/O log must equal the
    /// script entry for entry.
    #[test]
    fn prop_faithful_run_logs_script_verbatim(script in arbitrary_script()) {
        let mut device =
            MockDevice::with_config("mcan0", MockConfig::default().with_receive_own_frames(true));
        device.reset_script(script.clone());

        play_script(&mut device, &script);

        // ORACLE: every entry consumed exactly once, in append order
        prop_assert!(device.script().is_exhausted());
        prop_assert_eq!(device.actual_io(), script.as_slice());
        prop_assert!(device.warnings().is_empty());
    }

    /// With own-frame reception disabled, loopback entries are consumed but
    /// never delivered or logged; everything else keeps its order.
    #[test]
    fn prop_own_frames_never_delivered_when_disabled(script in arbitrary_script()) {
        let mut device = MockDevice::new("mcan0");
        device.reset_script(script.clone());

        play_script(&mut device, &script);

        let expected_log: Vec<_> = script
            .iter()
            .filter(|entry| !matches!(entry, ScriptEntry::OwnIncoming(_)))
            .cloned()
            .collect();
        let expected_inbox: Vec<_> = script
            .iter()
            .filter_map(|entry| match entry {
                ScriptEntry::Incoming(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect();
        let own_count =
            script.iter().filter(|entry| matches!(entry, ScriptEntry::OwnIncoming(_))).count();

        prop_assert!(device.script().is_exhausted());
        prop_assert_eq!(device.actual_io(), expected_log.as_slice());
        prop_assert_eq!(device.read_all_frames(), expected_inbox);
        prop_assert_eq!(device.diagnostics().len(), own_count);
    }

    /// Sends never fail under the default policy, whatever is sent.
    #[test]
    fn prop_send_always_succeeds(
        script in arbitrary_script(),
        sends in prop::collection::vec(arbitrary_frame(), 0..30),
    ) {
        let mut device = MockDevice::new("mcan0");
        device.reset_script(script);

        let mut last_cursor = device.cursor();
        for frame in &sends {
            prop_assert!(device.send(frame.clone()).is_ok());

            // ORACLE: cursor never moves backwards and never passes the end
            prop_assert!(device.cursor() >= last_cursor);
            prop_assert!(device.cursor() <= device.script().len());
            last_cursor = device.cursor();
        }

        let outgoing_logged = device
            .actual_io()
            .iter()
            .filter(|entry| entry.is_outgoing())
            .count();
        prop_assert_eq!(outgoing_logged, sends.len());
        prop_assert!(device.warnings().len() <= sends.len());
    }

    /// Installing a script always restarts consumption from the beginning.
    #[test]
    fn prop_reset_rewinds_cursor(
        first in arbitrary_script(),
        sends in prop::collection::vec(arbitrary_frame(), 0..10),
        head in arbitrary_frame(),
        tail in arbitrary_script(),
    ) {
        let mut device = MockDevice::new("mcan0");
        device.reset_script(first);
        for frame in sends {
            device.send(frame).expect("default policy");
        }

        let mut second = vec![ScriptEntry::Outgoing(head)];
        second.extend(tail);
        device.reset_script(second.clone());

        prop_assert_eq!(device.cursor(), 0);
        prop_assert_eq!(device.remaining_script(), second.as_slice());
    }
}
