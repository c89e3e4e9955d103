//! Standard invariant checks.
//!
//! These invariants capture behavioral properties of the mock device that must
//! hold after every operation, whatever the script or the device under test
//! does.

use mockcan_core::ScriptEntry;

use super::{Invariant, InvariantResult, Timeline, Violation};

/// Cursor never passes the end of the script.
pub struct CursorInBounds;

impl Invariant for CursorInBounds {
    fn name(&self) -> &'static str {
        "CursorInBounds"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        for (step, snapshot) in timeline.snapshots().iter().enumerate() {
            if snapshot.cursor > snapshot.script_len {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "step {step}: cursor {} past script length {}",
                        snapshot.cursor, snapshot.script_len
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Cursor never decreases while the same script is installed.
pub struct CursorMonotonicity;

impl Invariant for CursorMonotonicity {
    fn name(&self) -> &'static str {
        "CursorMonotonicity"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        for (step, window) in timeline.snapshots().windows(2).enumerate() {
            let (prev, next) = (&window[0], &window[1]);
            if prev.script_generation == next.script_generation && next.cursor < prev.cursor {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "step {}: cursor moved back {} → {} without a script reset",
                        step + 1,
                        prev.cursor,
                        next.cursor
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The actual-I/O log only ever grows at the end.
pub struct LogAppendOnly;

impl Invariant for LogAppendOnly {
    fn name(&self) -> &'static str {
        "LogAppendOnly"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        for (step, window) in timeline.snapshots().windows(2).enumerate() {
            let (prev, next) = (&window[0], &window[1]);
            if !next.actual_io.starts_with(&prev.actual_io) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "step {}: log of {} entries is not a prefix of the next log of {}",
                        step + 1,
                        prev.actual_io.len(),
                        next.actual_io.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Every accepted send appears once in the log as outgoing, and delivered
/// frames match the logged incoming entries.
pub struct LogMatchesCounters;

impl Invariant for LogMatchesCounters {
    fn name(&self) -> &'static str {
        "LogMatchesCounters"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        let Some(latest) = timeline.latest() else {
            return Ok(());
        };

        let outgoing = latest.logged(ScriptEntry::is_outgoing) as u64;
        if outgoing != latest.stats.frames_written {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{outgoing} outgoing entries logged, {} frames written",
                    latest.stats.frames_written
                ),
            });
        }

        let delivered = latest.logged(|entry| {
            matches!(entry, ScriptEntry::Incoming(_) | ScriptEntry::OwnIncoming(_))
        }) as u64;
        if delivered != latest.stats.frames_received {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{delivered} incoming entries logged, {} frames received",
                    latest.stats.frames_received
                ),
            });
        }

        if latest.stats.send_calls != latest.stats.frames_written + latest.stats.writes_rejected {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} sends, but {} written and {} rejected",
                    latest.stats.send_calls,
                    latest.stats.frames_written,
                    latest.stats.writes_rejected
                ),
            });
        }
        Ok(())
    }
}

/// At most one warning per written frame.
pub struct WarningsBoundedByWrites;

impl Invariant for WarningsBoundedByWrites {
    fn name(&self) -> &'static str {
        "WarningsBoundedByWrites"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        let Some(latest) = timeline.latest() else {
            return Ok(());
        };

        if latest.warnings as u64 > latest.stats.frames_written {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} warnings for {} written frames",
                    latest.warnings, latest.stats.frames_written
                ),
            });
        }
        Ok(())
    }
}

/// Own frames are suppressed only while own-frame reception is disabled, and
/// a step that suppresses own frames logs none.
pub struct SuppressedOwnFramesNotLogged;

impl Invariant for SuppressedOwnFramesNotLogged {
    fn name(&self) -> &'static str {
        "SuppressedOwnFramesNotLogged"
    }

    fn check(&self, timeline: &Timeline) -> InvariantResult {
        for (step, window) in timeline.snapshots().windows(2).enumerate() {
            let (prev, next) = (&window[0], &window[1]);
            let new_suppressions = next.diagnostics.len().saturating_sub(prev.diagnostics.len());
            if new_suppressions == 0 {
                continue;
            }

            let new_own_logged = next
                .logged(|e| matches!(e, ScriptEntry::OwnIncoming(_)))
                .saturating_sub(prev.logged(|e| matches!(e, ScriptEntry::OwnIncoming(_))));
            if next.receive_own_frames || new_own_logged > 0 {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "step {}: {new_suppressions} own frames suppressed while reception is {} \
                         and {new_own_logged} own frames logged",
                        step + 1,
                        if next.receive_own_frames { "enabled" } else { "disabled" },
                    ),
                });
            }
        }
        Ok(())
    }
}
