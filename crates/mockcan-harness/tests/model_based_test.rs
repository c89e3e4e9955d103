//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! mock device behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                |
//!      +---------+---------+
//!      v         v         v
//!    Model     Real     Compare
//! ```
//! ```

use mockcan_core::{
    CanFrame, ConfigOption, ConnectError, DeviceState, MockDevice, ScriptEntry, SendError,
};
use mockcan_harness::{
    EventRecorder, InvariantRegistry, ModelDevice, ModelEntry, ObservableState, Operation,
    OperationError, OperationResult, SmallFrame, Timeline, injected_error,
};
use proptest::prelude::*;

/// Real device wrapper that mirrors ModelDevice's interface.
struct RealDevice {
    device: MockDevice,
    recorder: EventRecorder,
    delivered: Vec<CanFrame>,
}

impl RealDevice {
    fn new(interface: &str) -> Self {
        let mut device = MockDevice::new(interface);
        let recorder = EventRecorder::attach(&mut device);
        Self { device, recorder, delivered: Vec::new() }
    }

    fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match op {
            Operation::Connect => match self.device.connect() {
                Ok(()) => OperationResult::Ok,
                Err(ConnectError::NotFound { .. }) => {
                    OperationResult::Error(OperationError::NotFound)
                },
                Err(ConnectError::AlreadyConnected { .. }) => {
                    OperationResult::Error(OperationError::AlreadyConnected)
                },
            },
            Operation::Disconnect => {
                self.device.disconnect();
                OperationResult::Ok
            },
            Operation::Send { frame } => match self.device.send(frame.to_frame()) {
                Ok(ack) => ack.warning.map_or(OperationResult::Ok, OperationResult::Warned),
                Err(SendError::UnexpectedSend(warning)) => OperationResult::Warned(warning),
                Err(SendError::WriteRejected) => {
                    unreachable!("write-error injection is never enabled here")
                },
            },
            Operation::ExpectOutgoing { frame } => {
                self.device.expect_outgoing(frame.to_frame());
                OperationResult::Ok
            },
            Operation::ExpectIncoming { frame } => {
                self.device.expect_incoming(frame.to_frame());
                OperationResult::Ok
            },
            Operation::ExpectOwnIncoming { frame } => {
                self.device.expect_own_incoming(frame.to_frame());
                OperationResult::Ok
            },
            Operation::ExpectError { code } => {
                self.device.expect_entries([injected_error(*code)]);
                OperationResult::Ok
            },
            Operation::SetReceiveOwn { enabled } => {
                self.device.set_configuration(ConfigOption::ReceiveOwnFrames(*enabled));
                OperationResult::Ok
            },
            Operation::ResetScript { entries } => {
                self.device.reset_script(entries.iter().map(ModelEntry::to_entry).collect());
                OperationResult::Ok
            },
        };

        self.delivered.extend(self.device.read_all_frames());
        result
    }

    fn observable_state(&self) -> ObservableState {
        ObservableState {
            connected: self.device.state() == DeviceState::Connected,
            actual_io: self.device.consumed_actual_io(),
            delivered: self.delivered.clone(),
            warnings: self.device.warnings().to_vec(),
            last_error: self.device.error().cloned(),
            remaining: self.device.remaining_script().to_vec(),
        }
    }
}

fn small_frame_strategy() -> impl Strategy<Value = SmallFrame> {
    (0..4u8, any::<u8>(), 0..9u8).prop_map(|(id, seed, len)| SmallFrame { id, seed, len })
}

fn model_entry_strategy() -> impl Strategy<Value = ModelEntry> {
    prop_oneof![
        4 => small_frame_strategy().prop_map(ModelEntry::Outgoing),
        3 => small_frame_strategy().prop_map(ModelEntry::Incoming),
        2 => small_frame_strategy().prop_map(ModelEntry::OwnIncoming),
        1 => any::<u8>().prop_map(|code| ModelEntry::Error { code }),
    ]
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        // Weight towards sends and appends, where ordering bugs live
        1 => Just(Operation::Connect),
        1 => Just(Operation::Disconnect),
        6 => small_frame_strategy().prop_map(|frame| Operation::Send { frame }),
        5 => small_frame_strategy().prop_map(|frame| Operation::ExpectOutgoing { frame }),
        3 => small_frame_strategy().prop_map(|frame| Operation::ExpectIncoming { frame }),
        2 => small_frame_strategy().prop_map(|frame| Operation::ExpectOwnIncoming { frame }),
        1 => any::<u8>().prop_map(|code| Operation::ExpectError { code }),
        1 => any::<bool>().prop_map(|enabled| Operation::SetReceiveOwn { enabled }),
        1 => prop::collection::vec(model_entry_strategy(), 0..12)
            .prop_map(|entries| Operation::ResetScript { entries }),
    ]
}

fn interface_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![4 => Just("mcan0"), 2 => Just("mcan1"), 1 => Just("sky9")]
}

proptest! {
    /// Verify that operation results and observable state match between the
    /// model and the real device after every step.
    #[test]
    fn prop_model_matches_real(
        interface in interface_strategy(),
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut model = ModelDevice::new(interface);
        let mut real = RealDevice::new(interface);

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                &model_result, &real_result,
                "Result mismatch at step {} for {:?}", i, op
            );
            prop_assert_eq!(
                model.observable_state(), real.observable_state(),
                "State mismatch at step {} after {:?}", i, op
            );
        }
    }

    /// Standard invariants hold after every step of a random run.
    #[test]
    fn prop_real_device_invariants(
        ops in prop::collection::vec(operation_strategy(), 0..80)
    ) {
        let mut real = RealDevice::new("mcan0");
        let registry = InvariantRegistry::standard();
        let mut timeline = Timeline::new();
        timeline.capture(&real.device);

        for (i, op) in ops.iter().enumerate() {
            let _ = real.apply(op);
            timeline.capture(&real.device);

            let checked = registry.check_all(&timeline);
            prop_assert!(checked.is_ok(), "step {} after {:?}: {:?}", i, op, checked);
        }
    }

    /// Every delivered frame reaches listeners exactly once.
    #[test]
    fn prop_notifications_cover_deliveries(
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut real = RealDevice::new("mcan0");

        for op in &ops {
            let _ = real.apply(op);
        }

        let notified: Vec<_> = real.recorder.received_batches().into_iter().flatten().collect();

        // ORACLE: notifications carry exactly the frames read from the inbox
        prop_assert_eq!(&notified, &real.delivered);
        prop_assert!(real.recorder.received_batches().iter().all(|batch| !batch.is_empty()));
        prop_assert_eq!(
            real.recorder.frames_written(),
            real.device.actual_io().iter().filter(|e| e.is_outgoing()).count()
        );
    }

    /// Replaying a script's outgoing frames leaves nothing but loopback
    /// suppressions behind.
    #[test]
    fn prop_replay_consumes_script(
        entries in prop::collection::vec(model_entry_strategy(), 0..30)
    ) {
        let mut model = ModelDevice::new("mcan0");
        let mut real = RealDevice::new("mcan0");
        let reset = Operation::ResetScript { entries: entries.clone() };
        model.apply(&reset);
        real.apply(&reset);

        for entry in &entries {
            if let ModelEntry::Outgoing(frame) = entry {
                let send = Operation::Send { frame: *frame };
                prop_assert_eq!(model.apply(&send), OperationResult::Ok);
                prop_assert_eq!(real.apply(&send), OperationResult::Ok);
            }
        }

        let state = real.observable_state();
        prop_assert!(state.remaining.is_empty());
        prop_assert!(state.warnings.is_empty());
        prop_assert!(!state.actual_io.iter().any(|e| matches!(e, ScriptEntry::OwnIncoming(_))));
        prop_assert_eq!(model.observable_state(), state);
    }
}
