//! Event recorder for asserting on device notifications.
//!
//! Attach a recorder to a device, drive the device, then inspect what was
//! emitted. The recorder is a cheap clone around shared storage, so the copy
//! held by the device's listener and the copy held by the test see the same
//! events.

use std::{cell::RefCell, rc::Rc};

use mockcan_core::{BusDevice, CanFrame, DeviceEvent, EventKind, RaisedError};

/// Records device events in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<DeviceEvent>>>,
}

impl EventRecorder {
    /// Create a detached recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every event emitted by `device`.
    pub fn attach<D: BusDevice + ?Sized>(device: &mut D) -> Self {
        let recorder = Self::new();
        let sink = recorder.clone();
        device.observers_mut().subscribe_all(move |event| sink.record(event));
        recorder
    }

    /// Record only events of `kind` emitted by `device`.
    pub fn attach_kind<D: BusDevice + ?Sized>(device: &mut D, kind: EventKind) -> Self {
        let recorder = Self::new();
        let sink = recorder.clone();
        device.observers_mut().subscribe(kind, move |event| sink.record(event));
        recorder
    }

    /// Append an event.
    pub fn record(&self, event: &DeviceEvent) {
        self.events.borrow_mut().push(event.clone());
    }

    /// All recorded events.
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|event| event.kind() == kind).count()
    }

    /// Frame batches from `FramesReceived` events, one per pump pass.
    pub fn received_batches(&self) -> Vec<Vec<CanFrame>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::FramesReceived(frames) => Some(frames.clone()),
                _ => None,
            })
            .collect()
    }

    /// Total frames reported by `FramesWritten` events.
    pub fn frames_written(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .map(|event| match event {
                DeviceEvent::FramesWritten(count) => *count,
                _ => 0,
            })
            .sum()
    }

    /// Errors from `ErrorOccurred` events.
    pub fn errors(&self) -> Vec<RaisedError> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::ErrorOccurred(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
