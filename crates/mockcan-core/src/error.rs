//! Error types for the mock CAN device.
//!
//! Errors are split by layer: frame construction, connection lifecycle,
//! sending, and plugin lookup. Verification failures during a scripted run are
//! NOT errors; they are [`ScriptWarning`]s collected on the device so a test
//! can run to completion and inspect every discrepancy afterwards.

use std::fmt;

use thiserror::Error;

use crate::{frame::MAX_PAYLOAD_LEN, warning::ScriptWarning};

/// Errors raised when constructing a [`crate::CanFrame`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Classic CAN frames carry at most eight data bytes
    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge {
        /// Actual payload length
        len: usize,
        /// Maximum payload length
        max: usize,
    },

    /// Identifier does not fit in 29 bits
    #[error("identifier out of range: {id:#x}")]
    IdentifierOutOfRange {
        /// Rejected identifier
        id: u32,
    },
}

impl FrameError {
    pub(crate) fn payload_too_large(len: usize) -> Self {
        Self::PayloadTooLarge { len, max: MAX_PAYLOAD_LEN }
    }
}

/// Errors returned by [`crate::BusDevice::connect`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The interface is not known to the interface registry
    #[error("no such interface: '{interface}'")]
    NotFound {
        /// Interface that was looked up
        interface: String,
    },

    /// `connect` called while already connected
    #[error("interface '{interface}' is already connected")]
    AlreadyConnected {
        /// Interface the device is bound to
        interface: String,
    },
}

/// Errors returned by [`crate::BusDevice::send`].
///
/// With the default configuration `send` only fails when write-error
/// injection is active. Frame mismatches never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// No outgoing frame was expected and the device is configured with
    /// [`crate::UnexpectedSendPolicy::Fail`]
    #[error(transparent)]
    UnexpectedSend(ScriptWarning),

    /// Write rejected by the configured write-error interval
    #[error("write rejected: simulated write failure")]
    WriteRejected,
}

/// Description attached to errors raised by write-error injection.
pub const WRITE_FAILURE_DESCRIPTION: &str = "simulated write failure";

/// Errors returned by [`crate::DeviceRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No factory registered under this plugin name
    #[error("No such plugin: '{plugin}'")]
    NoSuchPlugin {
        /// Requested plugin name
        plugin: String,
    },
}

/// Error classes a bus device can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reading from the bus failed
    Read,
    /// Writing to the bus failed
    Write,
    /// Connection could not be established or was lost
    Connection,
    /// Invalid configuration
    Configuration,
    /// Operation not supported in the current state
    Operation,
    /// Bus timed out
    Timeout,
    /// Anything else
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read error",
            Self::Write => "write error",
            Self::Connection => "connection error",
            Self::Configuration => "configuration error",
            Self::Operation => "operation error",
            Self::Timeout => "timeout error",
            Self::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}

/// Error state attached to a device: what went wrong and a human-readable
/// description.
///
/// Used both for errors the device raises itself (double connect, rejected
/// write) and for faults injected by the script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RaisedError {
    /// Error class
    pub kind: ErrorKind,
    /// Free-form description
    pub description: String,
}

impl RaisedError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into() }
    }
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_names_the_plugin() {
        let err = RegistryError::NoSuchPlugin { plugin: "muppetcan".to_string() };
        assert_eq!(err.to_string(), "No such plugin: 'muppetcan'");
    }

    #[test]
    fn raised_error_display_includes_kind() {
        let err = RaisedError::new(ErrorKind::Connection, "bus off");
        insta::assert_snapshot!(err.to_string(), @"connection error: bus off");
    }

    #[test]
    fn write_rejected_mentions_injection() {
        assert_eq!(SendError::WriteRejected.to_string(), "write rejected: simulated write failure");
    }
}
