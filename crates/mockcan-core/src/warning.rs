//! Verification warnings and diagnostics.
//!
//! A scripted run never aborts on a verification failure. Each discrepancy is
//! recorded as a [`ScriptWarning`] on the device and logged, and the run
//! continues. Intentional configuration effects (a loopback frame dropped
//! because own-frame reception is off) are recorded as [`Diagnostic`]s
//! instead, since they are not test failures.

use thiserror::Error;

use crate::frame::CanFrame;

/// A discrepancy between the script and what the device under test sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptWarning {
    /// The device sent a frame while no outgoing frame was due
    #[error("expected no frame at script position {index}, but got {actual}")]
    UnexpectedSend {
        /// Script cursor at the time of the send
        index: usize,
        /// Frame the device sent
        actual: CanFrame,
    },

    /// The device sent a different frame than the script expected
    #[error("expected {expected} at script position {index}, but got {actual}")]
    FrameMismatch {
        /// Position of the consumed outgoing entry
        index: usize,
        /// Frame the script expected
        expected: CanFrame,
        /// Frame the device sent
        actual: CanFrame,
    },
}

impl ScriptWarning {
    /// Script position the warning refers to.
    pub fn index(&self) -> usize {
        match self {
            Self::UnexpectedSend { index, .. } | Self::FrameMismatch { index, .. } => *index,
        }
    }

    /// Frame the device actually sent.
    pub fn actual(&self) -> &CanFrame {
        match self {
            Self::UnexpectedSend { actual, .. } | Self::FrameMismatch { actual, .. } => actual,
        }
    }
}

/// Non-failure observation made while pumping the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Own-incoming entry consumed without delivery (own-frame reception off)
    OwnFrameSuppressed {
        /// Position of the consumed entry
        index: usize,
        /// The suppressed frame
        frame: CanFrame,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: u32, payload: &[u8]) -> CanFrame {
        CanFrame::new(id, payload.to_vec()).unwrap()
    }

    #[test]
    fn mismatch_names_both_frames() {
        let warning = ScriptWarning::FrameMismatch {
            index: 3,
            expected: frame(0x18ef_0201, &[0x01]),
            actual: frame(0x18ef_0201, &[0x02]),
        };

        insta::assert_snapshot!(
            warning.to_string(),
            @"expected 18EF0201   [1]  01 at script position 3, but got 18EF0201   [1]  02"
        );
        assert_eq!(warning.index(), 3);
        assert_eq!(warning.actual(), &frame(0x18ef_0201, &[0x02]));
    }

    #[test]
    fn unexpected_send_names_position() {
        let warning = ScriptWarning::UnexpectedSend { index: 0, actual: frame(0x1abc_0000, &[]) };

        assert_eq!(
            warning.to_string(),
            "expected no frame at script position 0, but got 1ABC0000   [0]"
        );
    }
}
