//! Change notification for form controllers
//!
//! The presentation layer subscribes to a controller and re-reads its
//! state whenever notified. This is the whole contract: no payload, no
//! diffing, no framework.

use std::fmt;

/// Subscriber list for state-changed notifications
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn Fn() + Send>>,
}

impl ChangeNotifier {
    /// Register a listener invoked after every state mutation
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Invoke every listener, in subscription order
    pub fn notify(&self) {
        for listener in &self.listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_notify_reaches_every_listener() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut notifier = ChangeNotifier::default();

        for _ in 0..3 {
            let count = Arc::clone(&count);
            notifier.subscribe(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 3);

        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_no_listeners_is_a_noop() {
        ChangeNotifier::default().notify();
    }
}
