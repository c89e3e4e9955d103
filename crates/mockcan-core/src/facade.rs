//! Scripting facade.
//!
//! Append-only helpers a test uses to extend the script of a [`MockDevice`].
//! Each call is a script change, so the pump runs after it: incoming frames
//! appended while no outgoing entry is pending are delivered immediately. Batch
//! variants append everything first and pump once, so the frames arrive as a
//! single notification.

use crate::{
    error::{ErrorKind, RaisedError},
    frame::CanFrame,
    mock::MockDevice,
    script::ScriptEntry,
};

impl MockDevice {
    /// Expect the device under test to send `frame`.
    pub fn expect_outgoing(&mut self, frame: CanFrame) {
        self.append([ScriptEntry::Outgoing(frame)]);
    }

    /// Expect the device under test to send `frames`, in order.
    pub fn expect_outgoing_batch(&mut self, frames: impl IntoIterator<Item = CanFrame>) {
        self.append(frames.into_iter().map(ScriptEntry::Outgoing));
    }

    /// Deliver `frame` once every earlier outgoing entry has been sent.
    pub fn expect_incoming(&mut self, frame: CanFrame) {
        self.append([ScriptEntry::Incoming(frame)]);
    }

    /// Deliver `frames`, in order.
    pub fn expect_incoming_batch(&mut self, frames: impl IntoIterator<Item = CanFrame>) {
        self.append(frames.into_iter().map(ScriptEntry::Incoming));
    }

    /// Deliver `frame` as a loopback of the device's own send.
    pub fn expect_own_incoming(&mut self, frame: CanFrame) {
        self.append([ScriptEntry::OwnIncoming(frame)]);
    }

    /// Deliver `frames` as loopbacks, in order.
    pub fn expect_own_incoming_batch(&mut self, frames: impl IntoIterator<Item = CanFrame>) {
        self.append(frames.into_iter().map(ScriptEntry::OwnIncoming));
    }

    /// Raise a device error.
    pub fn expect_error(&mut self, kind: ErrorKind, description: impl Into<String>) {
        self.append([ScriptEntry::DeviceError(RaisedError::new(kind, description))]);
    }

    /// Append arbitrary entries, in order.
    pub fn expect_entries(&mut self, entries: impl IntoIterator<Item = ScriptEntry>) {
        self.append(entries);
    }

    /// Replace the script and reset the cursor to zero.
    ///
    /// The actual-I/O log, warnings and inbox are kept.
    pub fn reset_script(&mut self, entries: Vec<ScriptEntry>) {
        self.script_mut().reset(entries);
        self.pump();
    }

    fn append(&mut self, entries: impl IntoIterator<Item = ScriptEntry>) {
        self.script_mut().extend(entries);
        self.pump();
    }
}
