//! Device notifications and observer registration.
//!
//! Observers are plain closures. Delivery is synchronous: every listener runs
//! inside the call that triggered the event, in registration order, before
//! that call returns. There is no queue and no event loop.

use std::fmt;

use crate::{device::DeviceState, error::RaisedError, frame::CanFrame};

/// Notification emitted by a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Connection state changed
    StateChanged(DeviceState),
    /// Frames were written to the bus
    FramesWritten(usize),
    /// One pump pass delivered these frames, in script order
    FramesReceived(Vec<CanFrame>),
    /// An error was raised on the device
    ErrorOccurred(RaisedError),
}

impl DeviceEvent {
    /// Discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StateChanged(_) => EventKind::StateChanged,
            Self::FramesWritten(_) => EventKind::FramesWritten,
            Self::FramesReceived(_) => EventKind::FramesReceived,
            Self::ErrorOccurred(_) => EventKind::ErrorOccurred,
        }
    }
}

/// Event discriminant used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`DeviceEvent::StateChanged`]
    StateChanged,
    /// [`DeviceEvent::FramesWritten`]
    FramesWritten,
    /// [`DeviceEvent::FramesReceived`]
    FramesReceived,
    /// [`DeviceEvent::ErrorOccurred`]
    ErrorOccurred,
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Listener = Box<dyn FnMut(&DeviceEvent)>;

struct Registration {
    id: ObserverId,
    /// `None` receives every kind
    filter: Option<EventKind>,
    listener: Listener,
}

/// Registered listeners of one device.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("listeners", &self.registrations.len()).finish()
    }
}

impl Observers {
    /// Create an empty observer list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of event.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&DeviceEvent) + 'static,
    ) -> ObserverId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Register a listener for every event.
    pub fn subscribe_all(&mut self, listener: impl FnMut(&DeviceEvent) + 'static) -> ObserverId {
        self.register(None, Box::new(listener))
    }

    /// Remove a listener. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        self.registrations.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// True if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Deliver `event` to every matching listener.
    pub fn emit(&mut self, event: &DeviceEvent) {
        let kind = event.kind();
        for registration in &mut self.registrations {
            if registration.filter.is_none_or(|filter| filter == kind) {
                (registration.listener)(event);
            }
        }
    }

    fn register(&mut self, filter: Option<EventKind>, listener: Listener) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { id, filter, listener });
        id
    }
}
