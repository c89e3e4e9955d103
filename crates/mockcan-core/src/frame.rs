//! CAN frame value type.
//!
//! A [`CanFrame`] is one classic CAN data frame: an arbitration identifier and
//! up to eight payload bytes. Frames are immutable and compare structurally,
//! which is exactly the check the mock applies to outgoing traffic.

use std::fmt;

use bytes::Bytes;

use crate::error::FrameError;

/// Maximum payload length of a classic CAN frame.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// Largest identifier in the 11-bit base frame format.
pub const MAX_BASE_ID: u32 = 0x7FF;

/// Largest identifier in the 29-bit extended frame format.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// A single CAN data frame.
///
/// # Invariants
///
/// - `payload.len() <= MAX_PAYLOAD_LEN`
/// - `id <= MAX_EXTENDED_ID`
///
/// Both are enforced by [`CanFrame::new`]; there is no other constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanFrame {
    id: u32,
    payload: Bytes,
}

impl CanFrame {
    /// Create a frame, validating identifier range and payload length.
    ///
    /// # Errors
    ///
    /// - `FrameError::PayloadTooLarge` if the payload exceeds 8 bytes
    /// - `FrameError::IdentifierOutOfRange` if `id` needs more than 29 bits
    pub fn new(id: u32, payload: impl Into<Bytes>) -> Result<Self, FrameError> {
        let payload = payload.into();

        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::payload_too_large(payload.len()));
        }
        if id > MAX_EXTENDED_ID {
            return Err(FrameError::IdentifierOutOfRange { id });
        }

        Ok(Self { id, payload })
    }

    /// Arbitration identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the frame carries no data bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// True if the identifier needs the 29-bit extended format.
    pub fn is_extended(&self) -> bool {
        self.id > MAX_BASE_ID
    }
}

/// candump-style rendering: `18EF0201   [8]  01 8A 01 00 00 00 00 00`.
impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8X}   [{}]", self.id, self.payload.len())?;
        if !self.payload.is_empty() {
            f.write_str(" ")?;
            for byte in &self.payload {
                write!(f, " {byte:02X}")?;
            }
        }
        Ok(())
    }
}
