//! Scripted mock CAN device.
//!
//! [`MockDevice`] drives a device under test against a [`Script`]. Every frame
//! the device sends is checked against the next outgoing entry; everything
//! between two outgoing entries (incoming frames, loopback frames, injected
//! errors) is delivered automatically by the pump.
//!
//! # Send and Pump
//!
//! ```text
//! send(frame)
//!   ├─ verify against next Outgoing entry (warn on mismatch, never abort)
//!   ├─ log (Outgoing, frame), emit FramesWritten(1)
//!   └─ pump
//!        ├─ Incoming     → deliver, log
//!        ├─ OwnIncoming  → deliver + log if own frames enabled, else suppress
//!        ├─ DeviceError  → raise, log, keep going
//!        └─ Outgoing/end → stop, emit one FramesReceived for the whole batch
//! ```
//!
//! The pump also runs after every script or configuration change, so frames
//! scheduled at the start of a script arrive as soon as it is installed.
//!
//! Everything is synchronous. Observers run inside the call that triggered
//! them and nothing is deferred.

use std::collections::VecDeque;

use crate::{
    config::{ConfigOption, MockConfig, UnexpectedSendPolicy},
    device::{Ack, BusDevice, DeviceState},
    error::{ConnectError, ErrorKind, RaisedError, SendError, WRITE_FAILURE_DESCRIPTION},
    event::{DeviceEvent, Observers},
    frame::CanFrame,
    registry,
    script::{Script, ScriptEntry},
    warning::{Diagnostic, ScriptWarning},
};

/// Counters over the lifetime of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Calls to `send`, rejected or not
    pub send_calls: u64,
    /// Frames that reached the actual-I/O log as outgoing
    pub frames_written: u64,
    /// Sends rejected by write-error injection
    pub writes_rejected: u64,
    /// Frames delivered to the inbox
    pub frames_received: u64,
}

/// Mock CAN device bound to one simulated interface.
///
/// Owns its script, its actual-I/O log and its inbox. Not thread-safe: each
/// test constructs its own device.
#[derive(Debug)]
pub struct MockDevice {
    interface: String,
    state: DeviceState,
    config: MockConfig,
    script: Script,
    /// Everything that crossed the simulated boundary, in order
    actual_io: Vec<ScriptEntry>,
    /// Delivered frames not yet read
    inbox: VecDeque<CanFrame>,
    warnings: Vec<ScriptWarning>,
    diagnostics: Vec<Diagnostic>,
    error: Option<RaisedError>,
    observers: Observers,
    /// Sends counted towards the write-error interval
    sends_since_interval: u64,
    stats: DeviceStats,
}

impl MockDevice {
    /// Create an unconnected device with the default configuration.
    pub fn new(interface: impl Into<String>) -> Self {
        Self::with_config(interface, MockConfig::default())
    }

    /// Create an unconnected device with `config`.
    pub fn with_config(interface: impl Into<String>, config: MockConfig) -> Self {
        Self {
            interface: interface.into(),
            state: DeviceState::Unconnected,
            config,
            script: Script::new(),
            actual_io: Vec::new(),
            inbox: VecDeque::new(),
            warnings: Vec::new(),
            diagnostics: Vec::new(),
            error: None,
            observers: Observers::new(),
            sends_since_interval: 0,
            stats: DeviceStats::default(),
        }
    }

    /// Name of the simulated interface.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Current connection state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Current configuration.
    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Connect to the simulated interface.
    ///
    /// Fails without changing state if the interface is not registered.
    /// Connecting twice is an error: the device error is set to a connection
    /// error and the device stays connected.
    ///
    /// # Errors
    ///
    /// - `ConnectError::NotFound` if the interface is not registered
    /// - `ConnectError::AlreadyConnected` if already connected
    pub fn connect(&mut self) -> Result<(), ConnectError> {
        if self.state == DeviceState::Connected {
            self.raise_error(RaisedError::new(
                ErrorKind::Connection,
                format!("interface '{}' is already connected", self.interface),
            ));
            return Err(ConnectError::AlreadyConnected { interface: self.interface.clone() });
        }

        if registry::resolve(&self.interface).is_none() {
            tracing::debug!(interface = %self.interface, "connect to unknown interface");
            return Err(ConnectError::NotFound { interface: self.interface.clone() });
        }

        self.set_state(DeviceState::Connected);
        Ok(())
    }

    /// Disconnect. Succeeds in any state.
    pub fn disconnect(&mut self) {
        self.set_state(DeviceState::Unconnected);
    }

    /// Send a frame and verify it against the script.
    ///
    /// Works in any connection state. Verification failures are recorded as
    /// warnings and returned in the [`Ack`]; they never abort the send. The
    /// frame is logged, `FramesWritten(1)` is emitted and the pump runs.
    ///
    /// # Errors
    ///
    /// - `SendError::WriteRejected` if write-error injection rejects this
    ///   send. Nothing is verified, logged or pumped.
    /// - `SendError::UnexpectedSend` if no frame was due and the policy is
    ///   [`UnexpectedSendPolicy::Fail`]. The frame is still logged.
    pub fn send(&mut self, frame: CanFrame) -> Result<Ack, SendError> {
        self.stats.send_calls += 1;

        if self.write_error_due() {
            self.stats.writes_rejected += 1;
            tracing::debug!(frame = %frame, "write rejected by injection");
            self.raise_error(RaisedError::new(ErrorKind::Write, WRITE_FAILURE_DESCRIPTION));
            return Err(SendError::WriteRejected);
        }

        let warning = self.verify(&frame);

        self.actual_io.push(ScriptEntry::Outgoing(frame));
        self.stats.frames_written += 1;
        self.observers.emit(&DeviceEvent::FramesWritten(1));
        self.pump();

        match warning {
            Some(warning @ ScriptWarning::UnexpectedSend { .. })
                if self.config.unexpected_send == UnexpectedSendPolicy::Fail =>
            {
                Err(SendError::UnexpectedSend(warning))
            },
            warning => Ok(Ack { warning }),
        }
    }

    /// Apply a configuration change, then pump.
    pub fn set_configuration(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::ReceiveOwnFrames(enabled) => self.config.receive_own_frames = enabled,
            ConfigOption::ScriptInstall(entries) => self.script.reset(entries),
            ConfigOption::UnexpectedSend(policy) => self.config.unexpected_send = policy,
            ConfigOption::WriteErrorInterval(interval) => {
                self.config.write_error_interval = interval;
                self.sends_since_interval = 0;
            },
        }
        self.pump();
    }

    /// Last raised error.
    pub fn error(&self) -> Option<&RaisedError> {
        self.error.as_ref()
    }

    /// Clear the error state.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Pop the oldest delivered frame.
    pub fn read_frame(&mut self) -> Option<CanFrame> {
        self.inbox.pop_front()
    }

    /// Drain all delivered frames.
    pub fn read_all_frames(&mut self) -> Vec<CanFrame> {
        self.inbox.drain(..).collect()
    }

    /// Number of delivered frames not yet read.
    pub fn frames_available(&self) -> usize {
        self.inbox.len()
    }

    /// Actual-I/O log: every frame sent or delivered and every injected
    /// error, in the order they happened.
    pub fn actual_io(&self) -> &[ScriptEntry] {
        &self.actual_io
    }

    /// Snapshot of the actual-I/O log.
    pub fn consumed_actual_io(&self) -> Vec<ScriptEntry> {
        self.actual_io.clone()
    }

    /// Verification warnings recorded so far.
    pub fn warnings(&self) -> &[ScriptWarning] {
        &self.warnings
    }

    /// Take and clear the recorded warnings.
    pub fn take_warnings(&mut self) -> Vec<ScriptWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The installed script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Unconsumed script entries.
    pub fn remaining_script(&self) -> &[ScriptEntry] {
        self.script.remaining()
    }

    /// Position of the next unconsumed script entry.
    pub fn cursor(&self) -> usize {
        self.script.cursor()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Notification channel.
    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.observers
    }

    pub(crate) fn script_mut(&mut self) -> &mut Script {
        &mut self.script
    }

    /// Consume the next outgoing entry (if due) and compare.
    fn verify(&mut self, frame: &CanFrame) -> Option<ScriptWarning> {
        let index = self.script.cursor();

        let warning = match self.script.take_outgoing() {
            None => {
                tracing::warn!(index, actual = %frame, "expected no frame, but got one");
                Some(ScriptWarning::UnexpectedSend { index, actual: frame.clone() })
            },
            Some(expected) if expected == *frame => None,
            Some(expected) => {
                tracing::warn!(index, %expected, actual = %frame, "outgoing frame mismatch");
                Some(ScriptWarning::FrameMismatch { index, expected, actual: frame.clone() })
            },
        };

        if let Some(warning) = &warning {
            self.warnings.push(warning.clone());
        }
        warning
    }

    /// Deliver every due entry up to the next outgoing entry.
    pub(crate) fn pump(&mut self) {
        let mut batch = Vec::new();

        while let Some((index, entry)) = self.script.take_deliverable() {
            match entry {
                ScriptEntry::Incoming(frame) => {
                    self.actual_io.push(ScriptEntry::Incoming(frame.clone()));
                    batch.push(frame);
                },
                ScriptEntry::OwnIncoming(frame) if self.config.receive_own_frames => {
                    self.actual_io.push(ScriptEntry::OwnIncoming(frame.clone()));
                    batch.push(frame);
                },
                ScriptEntry::OwnIncoming(frame) => {
                    tracing::debug!(
                        index,
                        %frame,
                        "own frame suppressed, own-frame reception disabled"
                    );
                    self.diagnostics.push(Diagnostic::OwnFrameSuppressed { index, frame });
                },
                ScriptEntry::DeviceError(error) => {
                    tracing::info!(index, %error, "injecting device error");
                    self.actual_io.push(ScriptEntry::DeviceError(error.clone()));
                    self.raise_error(error);
                },
                // take_deliverable never yields outgoing entries
                ScriptEntry::Outgoing(_) => {},
            }
        }

        if batch.is_empty() {
            return;
        }

        self.stats.frames_received += batch.len() as u64;
        self.inbox.extend(batch.iter().cloned());
        self.observers.emit(&DeviceEvent::FramesReceived(batch));
    }

    fn write_error_due(&mut self) -> bool {
        let Some(interval) = self.config.write_error_interval else {
            return false;
        };
        self.sends_since_interval += 1;
        self.sends_since_interval % u64::from(interval.get()) == 0
    }

    fn raise_error(&mut self, error: RaisedError) {
        self.error = Some(error.clone());
        self.observers.emit(&DeviceEvent::ErrorOccurred(error));
    }

    fn set_state(&mut self, state: DeviceState) {
        if self.state == state {
            return;
        }
        tracing::debug!(
            interface = %self.interface,
            from = ?self.state,
            to = ?state,
            "state change"
        );
        self.state = state;
        self.observers.emit(&DeviceEvent::StateChanged(state));
    }
}

impl BusDevice for MockDevice {
    fn interface(&self) -> &str {
        MockDevice::interface(self)
    }

    fn state(&self) -> DeviceState {
        MockDevice::state(self)
    }

    fn connect(&mut self) -> Result<(), ConnectError> {
        MockDevice::connect(self)
    }

    fn disconnect(&mut self) {
        MockDevice::disconnect(self);
    }

    fn send(&mut self, frame: CanFrame) -> Result<Ack, SendError> {
        MockDevice::send(self, frame)
    }

    fn error(&self) -> Option<&RaisedError> {
        MockDevice::error(self)
    }

    fn read_frame(&mut self) -> Option<CanFrame> {
        MockDevice::read_frame(self)
    }

    fn frames_available(&self) -> usize {
        MockDevice::frames_available(self)
    }

    fn set_configuration(&mut self, option: ConfigOption) {
        MockDevice::set_configuration(self, option);
    }

    fn expect_entries(&mut self, entries: Vec<ScriptEntry>) {
        MockDevice::expect_entries(self, entries);
    }

    fn actual_io(&self) -> &[ScriptEntry] {
        MockDevice::actual_io(self)
    }

    fn warnings(&self) -> &[ScriptWarning] {
        MockDevice::warnings(self)
    }

    fn remaining_script(&self) -> &[ScriptEntry] {
        MockDevice::remaining_script(self)
    }

    fn observers_mut(&mut self) -> &mut Observers {
        MockDevice::observers_mut(self)
    }
}
