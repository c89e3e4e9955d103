//! Operations for model-based testing.
//!
//! Operations represent everything a test can do to a mock device. They are
//! generated randomly by proptest and applied to both the model and the real
//! device.

use arbitrary::Arbitrary;
use bytes::Bytes;
use mockcan_core::{CanFrame, ErrorKind, ScriptEntry, ScriptWarning};

/// Operations that can be applied to a device.
///
/// Operations are small and composable so proptest can explore interesting
/// interleavings of sends and script appends.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Connect the device.
    Connect,

    /// Disconnect the device.
    Disconnect,

    /// Device under test sends a frame.
    Send {
        /// Frame to send.
        frame: SmallFrame,
    },

    /// Append an expected outgoing frame.
    ExpectOutgoing {
        /// Expected frame.
        frame: SmallFrame,
    },

    /// Append an incoming frame.
    ExpectIncoming {
        /// Frame to deliver.
        frame: SmallFrame,
    },

    /// Append a loopback frame.
    ExpectOwnIncoming {
        /// Frame to deliver if own-frame reception is enabled.
        frame: SmallFrame,
    },

    /// Append an injected device error.
    ExpectError {
        /// Selects the error kind and description.
        code: u8,
    },

    /// Toggle own-frame reception.
    SetReceiveOwn {
        /// New flag value.
        enabled: bool,
    },

    /// Replace the script.
    ResetScript {
        /// New script, in order.
        entries: Vec<ModelEntry>,
    },
}

/// Compact script entry for generated scripts.
#[derive(Debug, Clone, Arbitrary)]
pub enum ModelEntry {
    /// Expected outgoing frame.
    Outgoing(SmallFrame),
    /// Incoming frame.
    Incoming(SmallFrame),
    /// Loopback frame.
    OwnIncoming(SmallFrame),
    /// Injected device error.
    Error {
        /// Selects the error kind and description.
        code: u8,
    },
}

impl ModelEntry {
    /// Expand to a real script entry.
    pub fn to_entry(&self) -> ScriptEntry {
        match self {
            Self::Outgoing(frame) => ScriptEntry::Outgoing(frame.to_frame()),
            Self::Incoming(frame) => ScriptEntry::Incoming(frame.to_frame()),
            Self::OwnIncoming(frame) => ScriptEntry::OwnIncoming(frame.to_frame()),
            Self::Error { code } => injected_error(*code),
        }
    }
}

/// Small frame description for testing.
///
/// A handful of identifiers keeps collisions (and therefore matching sends)
/// likely. Payload content is deterministic from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallFrame {
    /// Identifier selector (0-3).
    pub id: u8,
    /// Payload seed.
    pub seed: u8,
    /// Payload length hint (taken modulo 9).
    pub len: u8,
}

impl SmallFrame {
    /// Expand to a real frame.
    pub fn to_frame(&self) -> CanFrame {
        let id = 0x100 + u32::from(self.id % 4);
        let payload: Bytes = (0..self.len % 9).map(|i| self.seed.wrapping_add(i)).collect();

        // INVARIANT: identifier is below 0x7FF and payload is at most 8 bytes
        #[allow(clippy::expect_used)]
        CanFrame::new(id, payload).expect("small frames are always valid")
    }
}

/// Script entry injecting the device error selected by `code`.
pub fn injected_error(code: u8) -> ScriptEntry {
    let kind = match code % 7 {
        0 => ErrorKind::Read,
        1 => ErrorKind::Write,
        2 => ErrorKind::Connection,
        3 => ErrorKind::Configuration,
        4 => ErrorKind::Operation,
        5 => ErrorKind::Timeout,
        _ => ErrorKind::Unknown,
    };
    ScriptEntry::device_error(kind, format!("injected #{code}"))
}

/// Result of applying an operation.
///
/// Used to compare model and real device behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Send succeeded but did not match the script.
    Warned(ScriptWarning),

    /// Operation failed with expected error.
    Error(OperationError),
}

impl OperationResult {
    /// True unless the operation failed.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Interface is not registered.
    NotFound,

    /// Device is already connected.
    AlreadyConnected,
}
