//! Invariant checking for scripted device runs.
//!
//! A mock device keeps a script cursor, an append-only actual-I/O log and a
//! set of counters. Whatever the script and whatever the device under test
//! sends, those must stay consistent with each other from one call to the
//! next. The checks here state that consistency once so property tests can
//! apply it to every random run.
//!
//! # Timelines
//!
//! Capture a [`DeviceSnapshot`] after each call into a [`Timeline`]. Checks
//! that compare consecutive steps (cursor, log) and checks on the latest
//! step (counters) both read the same timeline, and every [`Violation`]
//! names the step it found.
//!
//! # Usage
//!
//! ```
//! use mockcan_core::MockDevice;
//! use mockcan_harness::{InvariantRegistry, Timeline};
//!
//! let mut device = MockDevice::new("mcan0");
//! let mut timeline = Timeline::new();
//! timeline.capture(&device);
//!
//! device.connect().unwrap();
//! timeline.capture(&device);
//!
//! InvariantRegistry::standard().assert_all(&timeline, "after connect");
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{
    CursorInBounds, CursorMonotonicity, LogAppendOnly, LogMatchesCounters,
    SuppressedOwnFramesNotLogged, WarningsBoundedByWrites,
};
pub use snapshot::{DeviceSnapshot, Timeline};

/// Outcome of one check over a [`Timeline`].
pub type InvariantResult = Result<(), Violation>;

/// A broken device property: which check failed and at what step.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Check that failed, as returned by [`Invariant::name`].
    pub invariant: &'static str,
    /// Step number and the offending cursor, log or counter values.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Property of a mock device that holds at every step of a run.
pub trait Invariant {
    /// Stable name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect every snapshot in `timeline`.
    ///
    /// Stops at the first step that breaks the property.
    fn check(&self, timeline: &Timeline) -> InvariantResult;
}

/// Ordered set of device checks run together over one timeline.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Registry with no checks; add them with [`InvariantRegistry::add`].
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Every check a scripted device run must pass:
    ///
    /// - [`CursorInBounds`]: script cursor stays within the script
    /// - [`CursorMonotonicity`]: cursor only moves back on a script reset
    /// - [`LogAppendOnly`]: the actual-I/O log is never rewritten
    /// - [`LogMatchesCounters`]: logged frames agree with the send/receive stats
    /// - [`WarningsBoundedByWrites`]: no more warnings than written frames
    /// - [`SuppressedOwnFramesNotLogged`]: loopback suppression only while
    ///   own-frame reception is off
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(CursorInBounds);
        registry.add(CursorMonotonicity);
        registry.add(LogAppendOnly);
        registry.add(LogMatchesCounters);
        registry.add(WarningsBoundedByWrites);
        registry.add(SuppressedOwnFramesNotLogged);
        registry
    }

    /// Run `invariant` after the checks already registered.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// True if no check is registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }

    /// Run every check over `timeline`, in registration order.
    ///
    /// Each failing check contributes one [`Violation`] and a `warn!` event,
    /// so a single broken run reports every property it broke.
    pub fn check_all(&self, timeline: &Timeline) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(timeline).err()).collect();

        for violation in &violations {
            tracing::warn!(
                invariant = violation.invariant,
                steps = timeline.len(),
                "invariant violated: {}",
                violation.message
            );
        }

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Panic listing every violation, prefixed with `context`.
    ///
    /// `context` names the point in the device session being checked, e.g.
    /// "after scripted session".
    #[allow(clippy::panic)]
    pub fn assert_all(&self, timeline: &Timeline, context: &str) {
        if let Err(violations) = self.check_all(timeline) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }
}
