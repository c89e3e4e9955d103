//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of a mock device at a point in
//! time. Invariants run against a [`Timeline`] of snapshots so properties
//! that span several steps (cursor monotonicity, append-only log) can be
//! checked the same way as point-in-time ones.

use mockcan_core::{DeviceState, DeviceStats, Diagnostic, MockDevice, ScriptEntry};

/// Observable state of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Connection state
    pub state: DeviceState,
    /// Script cursor
    pub cursor: usize,
    /// Total script length
    pub script_len: usize,
    /// Script resets so far. Cursors are only comparable within one generation.
    pub script_generation: u64,
    /// Actual-I/O log
    pub actual_io: Vec<ScriptEntry>,
    /// Number of recorded warnings
    pub warnings: usize,
    /// Recorded diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Lifetime counters
    pub stats: DeviceStats,
    /// Own-frame reception flag
    pub receive_own_frames: bool,
}

impl DeviceSnapshot {
    /// Capture the current state of `device`.
    pub fn capture(device: &MockDevice) -> Self {
        Self {
            state: device.state(),
            cursor: device.cursor(),
            script_len: device.script().len(),
            script_generation: device.script().generation(),
            actual_io: device.actual_io().to_vec(),
            warnings: device.warnings().len(),
            diagnostics: device.diagnostics().to_vec(),
            stats: device.stats(),
            receive_own_frames: device.config().receive_own_frames,
        }
    }

    /// Number of logged entries matching `predicate`.
    pub fn logged(&self, predicate: impl Fn(&ScriptEntry) -> bool) -> usize {
        self.actual_io.iter().filter(|entry| predicate(entry)).count()
    }
}

/// Ordered history of snapshots of one device.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    snapshots: Vec<DeviceSnapshot>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline holding a single snapshot.
    pub fn single(snapshot: DeviceSnapshot) -> Self {
        Self { snapshots: vec![snapshot] }
    }

    /// Append a snapshot.
    pub fn record(&mut self, snapshot: DeviceSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Capture `device` and append the snapshot.
    pub fn capture(&mut self, device: &MockDevice) {
        self.record(DeviceSnapshot::capture(device));
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[DeviceSnapshot] {
        &self.snapshots
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&DeviceSnapshot> {
        self.snapshots.last()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
