//! Test tooling for the scripted CAN bus mock.
//!
//! # Event Recording
//!
//! [`EventRecorder`] attaches to any [`mockcan_core::BusDevice`] and records
//! every notification it emits, so tests can assert on batching and ordering.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and a real
//! [`mockcan_core::MockDevice`], and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks over a [`Timeline`] of device snapshots. Use
//! [`InvariantRegistry::standard()`] for the common device invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod recorder;

pub use invariants::{
    CursorInBounds, CursorMonotonicity, DeviceSnapshot, Invariant, InvariantRegistry,
    InvariantResult, LogAppendOnly, LogMatchesCounters, SuppressedOwnFramesNotLogged, Timeline,
    Violation, WarningsBoundedByWrites,
};
pub use model::{
    ModelDevice, ModelEntry, ObservableState, Operation, OperationError, OperationResult,
    SmallFrame, injected_error,
};
pub use recorder::EventRecorder;
