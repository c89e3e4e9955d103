//! Script model: the ordered sequence of expected traffic for one test.
//!
//! A [`Script`] is a queue of [`ScriptEntry`] values plus a cursor marking the
//! next unconsumed entry. Entries are consumed exactly once, strictly in the
//! order they were appended. The cursor only moves forward; the only way back
//! to position zero is [`Script::reset`], which installs a fresh script.
//!
//! ```text
//!  consumed            remaining
//! ┌─────┬─────┬─────┐┌─────┬─────┐
//! │ Out │ In  │ Err ││ Out │ In  │
//! └─────┴─────┴─────┘└─────┴─────┘
//!                    ^ cursor
//! ```

use crate::{
    error::{ErrorKind, RaisedError},
    frame::CanFrame,
};

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    /// Frame the device under test is expected to send
    Outgoing(CanFrame),
    /// Frame delivered to the device under test
    Incoming(CanFrame),
    /// Loopback of a frame the device sent itself. Delivered only when
    /// own-frame reception is enabled.
    OwnIncoming(CanFrame),
    /// Bus fault raised on the device instead of delivering a frame
    DeviceError(RaisedError),
}

impl ScriptEntry {
    /// Shorthand for a [`ScriptEntry::DeviceError`] entry.
    pub fn device_error(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self::DeviceError(RaisedError::new(kind, description))
    }

    /// The frame carried by this entry. `None` for device errors.
    pub fn frame(&self) -> Option<&CanFrame> {
        match self {
            Self::Outgoing(frame) | Self::Incoming(frame) | Self::OwnIncoming(frame) => Some(frame),
            Self::DeviceError(_) => None,
        }
    }

    /// True for entries only the device under test can consume.
    pub fn is_outgoing(&self) -> bool {
        matches!(self, Self::Outgoing(_))
    }
}

/// Script entries and the consumption cursor.
///
/// # Invariants
///
/// - `cursor <= entries.len()`
/// - Between two resets, `cursor` never decreases.
/// - Entries before `cursor` are never modified or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    entries: Vec<ScriptEntry>,
    cursor: usize,
    /// Number of times the script has been reset
    generation: u64,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a script from entries, cursor at zero.
    pub fn from_entries(entries: Vec<ScriptEntry>) -> Self {
        Self { entries, cursor: 0, generation: 0 }
    }

    /// Append one entry.
    pub fn push(&mut self, entry: ScriptEntry) {
        self.entries.push(entry);
    }

    /// Append entries in iteration order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ScriptEntry>) {
        self.entries.extend(entries);
    }

    /// Replace all entries and move the cursor back to zero.
    pub fn reset(&mut self, entries: Vec<ScriptEntry>) {
        self.entries = entries;
        self.cursor = 0;
        self.generation += 1;
    }

    /// Entry at the cursor. `None` when the script is exhausted.
    pub fn peek(&self) -> Option<&ScriptEntry> {
        self.entries.get(self.cursor)
    }

    /// True if the entry at the cursor waits for a send.
    pub fn next_is_outgoing(&self) -> bool {
        self.peek().is_some_and(ScriptEntry::is_outgoing)
    }

    /// Consume the entry at the cursor if it is outgoing.
    ///
    /// Returns the expected frame. Leaves the cursor unchanged if the script
    /// is exhausted or the next entry is not outgoing.
    pub(crate) fn take_outgoing(&mut self) -> Option<CanFrame> {
        let Some(ScriptEntry::Outgoing(frame)) = self.peek() else {
            return None;
        };
        let frame = frame.clone();
        self.cursor += 1;
        Some(frame)
    }

    /// Consume the entry at the cursor unless it is outgoing.
    ///
    /// Returns the entry with its position. Outgoing entries stay in place:
    /// they can only be consumed by a send.
    pub(crate) fn take_deliverable(&mut self) -> Option<(usize, ScriptEntry)> {
        let entry = self.peek().filter(|entry| !entry.is_outgoing())?.clone();
        let index = self.cursor;
        self.cursor += 1;

        debug_assert!(self.cursor <= self.entries.len());
        Some((index, entry))
    }

    /// Position of the next unconsumed entry.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of resets since creation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of entries, consumed or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the script has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if every entry has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// All entries, consumed or not.
    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Entries already consumed.
    pub fn consumed(&self) -> &[ScriptEntry] {
        self.entries.get(..self.cursor).unwrap_or_default()
    }

    /// Unconsumed suffix.
    pub fn remaining(&self) -> &[ScriptEntry] {
        self.entries.get(self.cursor..).unwrap_or_default()
    }
}

/// Builds a list of script entries in call order.
///
/// ```
/// use mockcan_core::{CanFrame, ErrorKind, ScriptBuilder};
///
/// let request = CanFrame::new(0x18ef_0201, vec![0x01, 0x8a]).unwrap();
/// let response = CanFrame::new(0x18ef_0102, vec![0x01]).unwrap();
///
/// let entries = ScriptBuilder::new()
///     .outgoing(request)
///     .incoming(response)
///     .error(ErrorKind::Read, "bus off")
///     .build();
/// assert_eq!(entries.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    entries: Vec<ScriptEntry>,
}

impl ScriptBuilder {
    /// Start an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect the device to send `frame`.
    #[must_use]
    pub fn outgoing(mut self, frame: CanFrame) -> Self {
        self.entries.push(ScriptEntry::Outgoing(frame));
        self
    }

    /// Deliver `frame` to the device.
    #[must_use]
    pub fn incoming(mut self, frame: CanFrame) -> Self {
        self.entries.push(ScriptEntry::Incoming(frame));
        self
    }

    /// Deliver `frame` as a loopback of the device's own send.
    #[must_use]
    pub fn own_incoming(mut self, frame: CanFrame) -> Self {
        self.entries.push(ScriptEntry::OwnIncoming(frame));
        self
    }

    /// Raise a device error.
    #[must_use]
    pub fn error(mut self, kind: ErrorKind, description: impl Into<String>) -> Self {
        self.entries.push(ScriptEntry::device_error(kind, description));
        self
    }

    /// Finish and return the entries.
    pub fn build(self) -> Vec<ScriptEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u32) -> CanFrame {
        CanFrame::new(id, vec![id as u8]).unwrap()
    }

    #[test]
    fn take_outgoing_stops_at_incoming() {
        let mut script = Script::from_entries(
            ScriptBuilder::new().incoming(frame(1)).outgoing(frame(2)).build(),
        );

        assert_eq!(script.take_outgoing(), None);
        assert_eq!(script.cursor(), 0);
    }

    #[test]
    fn take_deliverable_stops_at_outgoing() {
        let mut script = Script::from_entries(
            ScriptBuilder::new()
                .incoming(frame(1))
                .error(ErrorKind::Read, "boom")
                .outgoing(frame(2))
                .build(),
        );

        assert_eq!(script.take_deliverable(), Some((0, ScriptEntry::Incoming(frame(1)))));
        assert!(matches!(script.take_deliverable(), Some((1, ScriptEntry::DeviceError(_)))));
        assert_eq!(script.take_deliverable(), None);
        assert_eq!(script.cursor(), 2);
        assert!(script.next_is_outgoing());

        assert_eq!(script.take_outgoing(), Some(frame(2)));
        assert!(script.is_exhausted());
    }

    #[test]
    fn reset_rewinds_cursor_and_bumps_generation() {
        let mut script = Script::from_entries(ScriptBuilder::new().outgoing(frame(1)).build());
        script.take_outgoing();
        assert_eq!(script.cursor(), 1);

        script.reset(ScriptBuilder::new().incoming(frame(2)).incoming(frame(3)).build());

        assert_eq!(script.cursor(), 0);
        assert_eq!(script.len(), 2);
        assert_eq!(script.generation(), 1);
    }

    #[test]
    fn consumed_and_remaining_partition_entries() {
        let mut script = Script::new();
        script.extend(ScriptBuilder::new().outgoing(frame(1)).incoming(frame(2)).build());
        script.take_outgoing();

        assert_eq!(script.consumed(), &[ScriptEntry::Outgoing(frame(1))]);
        assert_eq!(script.remaining(), &[ScriptEntry::Incoming(frame(2))]);
    }

    #[test]
    fn exhausted_script_yields_nothing() {
        let mut script = Script::new();

        assert!(script.is_exhausted());
        assert_eq!(script.take_outgoing(), None);
        assert_eq!(script.take_deliverable(), None);
        assert!(script.remaining().is_empty());
    }
}
