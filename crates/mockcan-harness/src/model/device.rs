//! Model device - the reference implementation.
//!
//! A deliberately naive rendition of the mock device: a vector of entries and
//! an index, with the delivery rules written out directly. It is the oracle
//! against which [`mockcan_core::MockDevice`] is verified.

use mockcan_core::{CanFrame, ErrorKind, RaisedError, ScriptEntry, ScriptWarning, mock_interfaces};

use super::operation::{ModelEntry, Operation, OperationError, OperationResult, injected_error};

/// Observable state for oracle comparison.
///
/// This is the subset of device state that can be compared against the real
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Whether the device is connected.
    pub connected: bool,
    /// Everything that crossed the simulated boundary.
    pub actual_io: Vec<ScriptEntry>,
    /// Frames delivered to the device under test, in order.
    pub delivered: Vec<CanFrame>,
    /// Verification warnings, in order.
    pub warnings: Vec<ScriptWarning>,
    /// Last raised error.
    pub last_error: Option<RaisedError>,
    /// Unconsumed script entries.
    pub remaining: Vec<ScriptEntry>,
}

/// Model device with the default configuration.
#[derive(Debug, Clone)]
pub struct ModelDevice {
    interface: String,
    connected: bool,
    receive_own_frames: bool,
    script: Vec<ScriptEntry>,
    cursor: usize,
    actual_io: Vec<ScriptEntry>,
    delivered: Vec<CanFrame>,
    warnings: Vec<ScriptWarning>,
    last_error: Option<RaisedError>,
}

impl ModelDevice {
    /// Create an unconnected model device bound to `interface`.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            connected: false,
            receive_own_frames: false,
            script: Vec::new(),
            cursor: 0,
            actual_io: Vec::new(),
            delivered: Vec::new(),
            warnings: Vec::new(),
            last_error: None,
        }
    }

    /// Apply an operation and return the result.
    ///
    /// The result should match the real implementation's result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Connect => self.apply_connect(),
            Operation::Disconnect => {
                self.connected = false;
                OperationResult::Ok
            },
            Operation::Send { frame } => self.apply_send(frame.to_frame()),
            Operation::ExpectOutgoing { frame } => {
                self.append(ScriptEntry::Outgoing(frame.to_frame()))
            },
            Operation::ExpectIncoming { frame } => {
                self.append(ScriptEntry::Incoming(frame.to_frame()))
            },
            Operation::ExpectOwnIncoming { frame } => {
                self.append(ScriptEntry::OwnIncoming(frame.to_frame()))
            },
            Operation::ExpectError { code } => self.append(injected_error(*code)),
            Operation::SetReceiveOwn { enabled } => {
                self.receive_own_frames = *enabled;
                self.deliver();
                OperationResult::Ok
            },
            Operation::ResetScript { entries } => {
                self.script = entries.iter().map(ModelEntry::to_entry).collect();
                self.cursor = 0;
                self.deliver();
                OperationResult::Ok
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            connected: self.connected,
            actual_io: self.actual_io.clone(),
            delivered: self.delivered.clone(),
            warnings: self.warnings.clone(),
            last_error: self.last_error.clone(),
            remaining: self.script[self.cursor..].to_vec(),
        }
    }

    fn apply_connect(&mut self) -> OperationResult {
        if self.connected {
            self.last_error = Some(RaisedError::new(
                ErrorKind::Connection,
                format!("interface '{}' is already connected", self.interface),
            ));
            return OperationResult::Error(OperationError::AlreadyConnected);
        }

        if !mock_interfaces().iter().any(|info| info.name() == self.interface) {
            return OperationResult::Error(OperationError::NotFound);
        }

        self.connected = true;
        OperationResult::Ok
    }

    fn apply_send(&mut self, frame: CanFrame) -> OperationResult {
        let index = self.cursor;
        let warning = match self.script.get(index) {
            Some(ScriptEntry::Outgoing(expected)) => {
                let expected = expected.clone();
                self.cursor += 1;
                (expected != frame).then(|| ScriptWarning::FrameMismatch {
                    index,
                    expected,
                    actual: frame.clone(),
                })
            },
            _ => Some(ScriptWarning::UnexpectedSend { index, actual: frame.clone() }),
        };

        self.actual_io.push(ScriptEntry::Outgoing(frame));
        self.deliver();

        match warning {
            Some(warning) => {
                self.warnings.push(warning.clone());
                OperationResult::Warned(warning)
            },
            None => OperationResult::Ok,
        }
    }

    fn append(&mut self, entry: ScriptEntry) -> OperationResult {
        self.script.push(entry);
        self.deliver();
        OperationResult::Ok
    }

    /// Consume entries up to the next outgoing one.
    fn deliver(&mut self) {
        while let Some(entry) = self.script.get(self.cursor) {
            match entry {
                ScriptEntry::Outgoing(_) => return,
                ScriptEntry::Incoming(frame) => self.delivered.push(frame.clone()),
                ScriptEntry::OwnIncoming(frame) if self.receive_own_frames => {
                    self.delivered.push(frame.clone());
                },
                ScriptEntry::OwnIncoming(_) => {
                    self.cursor += 1;
                    continue;
                },
                ScriptEntry::DeviceError(error) => self.last_error = Some(error.clone()),
            }
            self.actual_io.push(entry.clone());
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SmallFrame;

    const A: SmallFrame = SmallFrame { id: 0, seed: 1, len: 2 };
    const B: SmallFrame = SmallFrame { id: 1, seed: 2, len: 2 };

    #[test]
    fn unknown_interface_never_connects() {
        let mut model = ModelDevice::new("sky9");

        let result = model.apply(&Operation::Connect);

        assert_eq!(result, OperationResult::Error(OperationError::NotFound));
        assert!(!model.observable_state().connected);
    }

    #[test]
    fn incoming_waits_for_pending_outgoing() {
        let mut model = ModelDevice::new("mcan0");
        model.apply(&Operation::ExpectOutgoing { frame: A });
        model.apply(&Operation::ExpectIncoming { frame: B });
        assert!(model.observable_state().delivered.is_empty());

        assert_eq!(model.apply(&Operation::Send { frame: A }), OperationResult::Ok);
        assert_eq!(model.observable_state().delivered, vec![B.to_frame()]);
    }

    #[test]
    fn suppressed_own_frame_is_consumed_silently() {
        let mut model = ModelDevice::new("mcan0");
        model.apply(&Operation::ExpectOwnIncoming { frame: A });

        let state = model.observable_state();
        assert!(state.actual_io.is_empty());
        assert!(state.remaining.is_empty());
    }

    #[test]
    fn send_on_exhausted_script_warns() {
        let mut model = ModelDevice::new("mcan0");

        let result = model.apply(&Operation::Send { frame: A });

        assert!(matches!(
            result,
            OperationResult::Warned(ScriptWarning::UnexpectedSend { index: 0, .. })
        ));
        assert_eq!(model.observable_state().actual_io.len(), 1);
    }
}
