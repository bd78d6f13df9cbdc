//! Observer registry shared between the manager handle and its event loop.
//!
//! Two kinds of listener exist side by side:
//!
//! - callback slots (`on_state_change`, `on_message`) hold at most one
//!   callback each, and registering replaces the previous one;
//! - channel subscribers are appended, each getting its own copy of every
//!   [`ConnectionEvent`] until its receiver is dropped.
//!
//! Callbacks run on the event loop task, never while a lock is held, so a
//! callback may call back into the manager.

use crate::messages::{ConnectionEvent, ConnectionState};
use parking_lot::Mutex;
use std::sync::Arc;

type StateCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;
type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    state: Mutex<Option<StateCallback>>,
    message: Mutex<Option<MessageCallback>>,
    subscribers: Mutex<Vec<flume::Sender<ConnectionEvent>>>,
}

impl Observers {
    pub(crate) fn set_state_callback(&self, callback: StateCallback) {
        *self.state.lock() = Some(callback);
    }

    pub(crate) fn set_message_callback(&self, callback: MessageCallback) {
        *self.message.lock() = Some(callback);
    }

    pub(crate) fn subscribe(&self) -> flume::Receiver<ConnectionEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub(crate) fn state_changed(&self, state: ConnectionState) {
        let callback = self.state.lock().clone();
        if let Some(callback) = callback {
            callback(state);
        }
        self.publish(&ConnectionEvent::StateChanged(state));
    }

    pub(crate) fn message(&self, text: &str) {
        let callback = self.message.lock().clone();
        if let Some(callback) = callback {
            callback(text);
        }
        self.publish(&ConnectionEvent::Message(text.to_string()));
    }

    pub(crate) fn gave_up(&self, attempts: u32) {
        self.publish(&ConnectionEvent::ReconnectGaveUp { attempts });
    }

    fn publish(&self, event: &ConnectionEvent) {
        // Drop subscribers whose receiver is gone.
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_state_callback_is_replaced() {
        let observers = Observers::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        observers.set_state_callback(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        observers.state_changed(ConnectionState::Connected);

        let counter = second.clone();
        observers.set_state_callback(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        observers.state_changed(ConnectionState::Disconnected);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribers_are_appended() {
        let observers = Observers::default();
        let a = observers.subscribe();
        let b = observers.subscribe();

        observers.message("hi");

        assert_eq!(a.try_recv().unwrap(), ConnectionEvent::Message("hi".to_string()));
        assert_eq!(b.try_recv().unwrap(), ConnectionEvent::Message("hi".to_string()));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let observers = Observers::default();
        let kept = observers.subscribe();
        drop(observers.subscribe());

        observers.gave_up(4);

        assert_eq!(observers.subscribers.lock().len(), 1);
        assert_eq!(
            kept.try_recv().unwrap(),
            ConnectionEvent::ReconnectGaveUp { attempts: 4 }
        );
    }

    #[test]
    fn test_callback_may_reenter() {
        let observers = Arc::new(Observers::default());
        let inner = observers.clone();
        observers.set_message_callback(Arc::new(move |_| {
            inner.set_state_callback(Arc::new(|_| {}));
        }));
        observers.message("reenter");
    }
}
