//! Scripted mock CAN bus device.
//!
//! A deterministic test double for a CAN transceiver. A test scripts the exact
//! sequence of frames the device under test must send, the frames it should
//! receive in response, loopbacks of its own frames and bus faults. The mock
//! then verifies every send against the script and delivers the responses.
//!
//! # Architecture
//!
//! Pure, synchronous state machine: no I/O, no runtime, no threads.
//! Verification failures never abort a run; they are collected as
//! [`ScriptWarning`]s so a test can run to completion and inspect every
//! discrepancy.
//!
//! # Components
//!
//! - [`CanFrame`]: identifier + up to eight payload bytes
//! - [`ScriptEntry`], [`Script`], [`ScriptBuilder`]: the scripted traffic
//! - [`MockDevice`]: connection lifecycle, send/verify and the delivery pump
//! - [`BusDevice`]: capability trait the mock implements
//! - [`DeviceRegistry`]: plugin name → device factory
//! - [`Observers`]: synchronous notification channel
//!
//! # Example
//!
//! ```
//! use mockcan_core::{CanFrame, MockDevice};
//!
//! let request = CanFrame::new(0x18ef_0201, vec![0x01, 0x8a]).unwrap();
//! let response = CanFrame::new(0x18ef_0102, vec![0x01, 0x8a, 0x00]).unwrap();
//!
//! let mut device = MockDevice::new("mcan0");
//! device.expect_outgoing(request.clone());
//! device.expect_incoming(response.clone());
//!
//! device.connect().unwrap();
//! let ack = device.send(request).unwrap();
//!
//! assert!(ack.is_verified());
//! assert_eq!(device.read_frame(), Some(response));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod device;
pub mod error;
pub mod event;
mod facade;
pub mod frame;
pub mod mock;
pub mod registry;
pub mod script;
pub mod warning;

pub use config::{ConfigOption, MockConfig, UnexpectedSendPolicy};
pub use device::{Ack, BusDevice, DeviceState};
pub use error::{ConnectError, ErrorKind, FrameError, RaisedError, RegistryError, SendError};
pub use event::{DeviceEvent, EventKind, ObserverId, Observers};
pub use frame::CanFrame;
pub use mock::{DeviceStats, MockDevice};
pub use registry::{
    DeviceFactory, DeviceRegistry, InterfaceInfo, MOCK_PLUGIN, MockDeviceFactory, mock_interfaces,
};
pub use script::{Script, ScriptBuilder, ScriptEntry};
pub use warning::{Diagnostic, ScriptWarning};
