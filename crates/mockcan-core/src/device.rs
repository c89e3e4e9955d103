//! Bus device capability.
//!
//! [`BusDevice`] is the contract a CAN device offers to the code under test:
//! connection lifecycle, sending, reading delivered frames, the last raised
//! error and a notification channel. It also carries the scripting surface a
//! test needs on a device it only knows as a trait object: appending script
//! entries and reading back the actual-I/O log, the warnings and whatever is
//! left of the script. [`crate::MockDevice`] is one
//! implementation; the [`crate::DeviceRegistry`] hands devices out as
//! `Box<dyn BusDevice>` so callers never depend on the concrete type.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────────┐  connect   ┌───────────┐
//! │ Unconnected │───────────>│ Connected │
//! └─────────────┘            └───────────┘
//!        ^       disconnect        │
//!        └─────────────────────────┘
//! ```

use crate::{
    config::ConfigOption,
    error::{ConnectError, RaisedError, SendError},
    event::Observers,
    frame::CanFrame,
    script::ScriptEntry,
    warning::ScriptWarning,
};

/// Connection state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceState {
    /// Not connected (initial state)
    #[default]
    Unconnected,
    /// Connected to its interface
    Connected,
}

/// Successful send.
///
/// Carries the verification warning, if any. A send with a warning still
/// reached the bus; the warning is also recorded on the device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    /// Verification warning for this send
    pub warning: Option<ScriptWarning>,
}

impl Ack {
    /// True if the frame matched the script.
    pub fn is_verified(&self) -> bool {
        self.warning.is_none()
    }
}

/// Capabilities of a CAN bus device.
pub trait BusDevice {
    /// Name of the interface this device is bound to.
    fn interface(&self) -> &str;

    /// Current connection state.
    fn state(&self) -> DeviceState;

    /// Connect to the interface.
    ///
    /// # Errors
    ///
    /// - `ConnectError::NotFound` if the interface is unknown
    /// - `ConnectError::AlreadyConnected` if already connected
    fn connect(&mut self) -> Result<(), ConnectError>;

    /// Disconnect. Idempotent.
    fn disconnect(&mut self);

    /// Write a frame to the bus.
    fn send(&mut self, frame: CanFrame) -> Result<Ack, SendError>;

    /// Last error raised on the device.
    fn error(&self) -> Option<&RaisedError>;

    /// Pop the oldest delivered frame.
    fn read_frame(&mut self) -> Option<CanFrame>;

    /// Number of delivered frames not yet read.
    fn frames_available(&self) -> usize;

    /// Apply a configuration change.
    fn set_configuration(&mut self, option: ConfigOption);

    /// Append entries to the installed script, in order.
    fn expect_entries(&mut self, entries: Vec<ScriptEntry>);

    /// Everything sent, delivered or raised so far, in order.
    fn actual_io(&self) -> &[ScriptEntry];

    /// Verification warnings recorded so far.
    fn warnings(&self) -> &[ScriptWarning];

    /// Unconsumed script entries.
    fn remaining_script(&self) -> &[ScriptEntry];

    /// Notification channel.
    fn observers_mut(&mut self) -> &mut Observers;
}
