//! Event channel implementation using crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the scanner and the sorting workflow.
///
/// Cloneable; sending never blocks and never fails. If the receiver is
/// gone the event is dropped, so reporting stays optional.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events on the presentation side (or in tests).
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Returns an iterator that ends once every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Collect everything already queued without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender nobody listens to.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
