//! Mock device configuration.
//!
//! A fixed set of typed options rather than an open key/value map. Options
//! can be set at construction ([`MockConfig`]) or changed during a run
//! ([`ConfigOption`] via [`crate::MockDevice::set_configuration`]).

use std::num::NonZeroU32;

use crate::script::ScriptEntry;

/// Own-frame reception is off unless a test opts in.
pub const DEFAULT_RECEIVE_OWN_FRAMES: bool = false;

/// What `send` reports when no outgoing frame is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnexpectedSendPolicy {
    /// Record a warning and report success
    #[default]
    Warn,
    /// Record a warning and fail the send. The frame is still logged.
    Fail,
}

/// Mock device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Deliver [`ScriptEntry::OwnIncoming`] entries
    pub receive_own_frames: bool,
    /// Behaviour of `send` when no outgoing frame is due
    pub unexpected_send: UnexpectedSendPolicy,
    /// Reject every n-th call to `send`. `None` disables injection.
    pub write_error_interval: Option<NonZeroU32>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            receive_own_frames: DEFAULT_RECEIVE_OWN_FRAMES,
            unexpected_send: UnexpectedSendPolicy::default(),
            write_error_interval: None,
        }
    }
}

impl MockConfig {
    /// Enable or disable own-frame reception.
    #[must_use]
    pub fn with_receive_own_frames(mut self, enabled: bool) -> Self {
        self.receive_own_frames = enabled;
        self
    }

    /// Set the unexpected-send policy.
    #[must_use]
    pub fn with_unexpected_send(mut self, policy: UnexpectedSendPolicy) -> Self {
        self.unexpected_send = policy;
        self
    }

    /// Reject every `interval`-th send.
    #[must_use]
    pub fn with_write_error_interval(mut self, interval: NonZeroU32) -> Self {
        self.write_error_interval = Some(interval);
        self
    }
}

/// A single configuration change applied to a running device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOption {
    /// Gate delivery of own-incoming entries
    ReceiveOwnFrames(bool),
    /// Replace the script and reset the cursor to zero
    ScriptInstall(Vec<ScriptEntry>),
    /// Change the unexpected-send policy
    UnexpectedSend(UnexpectedSendPolicy),
    /// Change write-error injection. Restarts the send count.
    WriteErrorInterval(Option<NonZeroU32>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_permissive() {
        let config = MockConfig::default();

        assert!(!config.receive_own_frames);
        assert_eq!(config.unexpected_send, UnexpectedSendPolicy::Warn);
        assert_eq!(config.write_error_interval, None);
    }

    #[test]
    fn builder_methods_set_fields() {
        let interval = NonZeroU32::new(3).unwrap();
        let config = MockConfig::default()
            .with_receive_own_frames(true)
            .with_unexpected_send(UnexpectedSendPolicy::Fail)
            .with_write_error_interval(interval);

        assert!(config.receive_own_frames);
        assert_eq!(config.unexpected_send, UnexpectedSendPolicy::Fail);
        assert_eq!(config.write_error_interval, Some(interval));
    }
}
