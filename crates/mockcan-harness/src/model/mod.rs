//! Reference model for model-based testing.
//!
//! Operations are applied to both [`ModelDevice`] and a real
//! [`mockcan_core::MockDevice`], and their observable states are compared.

mod device;
mod operation;

pub use device::{ModelDevice, ObservableState};
pub use operation::{
    ModelEntry, Operation, OperationError, OperationResult, SmallFrame, injected_error,
};
