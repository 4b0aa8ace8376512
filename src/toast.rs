//! Toast notification queue
//!
//! Toasts auto-dismiss after their duration via a per-toast timer task;
//! a sticky toast (no duration) stays until dismissed explicitly. The
//! queue is cheap to clone and safe to share across tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

/// How long a toast stays up unless told otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// Visual flavor of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Error,
    Warning,
    Info,
}

/// Optional action button attached to a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastAction {
    pub label: String,
}

/// One queued notification
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    /// `None` or a zero duration means sticky: no auto-dismiss
    pub duration: Option<Duration>,
    pub action: Option<ToastAction>,
}

#[derive(Default)]
struct Inner {
    toasts: Vec<Toast>,
    timers: HashMap<Uuid, JoinHandle<()>>,
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Shared queue of active toasts
#[derive(Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<Inner>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked after every queue change
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.lock().unwrap().push(Arc::new(listener));
    }

    /// Snapshot of the active toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.lock().unwrap().toasts.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue a toast with the default duration
    pub fn push(
        &self,
        title: impl Into<String>,
        description: Option<String>,
        variant: ToastVariant,
    ) -> Uuid {
        self.push_toast(Toast {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            variant,
            duration: Some(DEFAULT_TOAST_DURATION),
            action: None,
        })
    }

    /// Queue a fully specified toast
    pub fn push_toast(&self, toast: Toast) -> Uuid {
        let id = toast.id;
        // Zero-length durations behave like None: the toast is sticky
        let duration = toast.duration.filter(|duration| !duration.is_zero());

        {
            let mut inner = self.inner.lock().unwrap();
            inner.toasts.push(toast);

            if let Some(duration) = duration {
                let queue = self.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    queue.expire(id);
                });
                inner.timers.insert(id, handle);
            }
        }

        self.notify();
        id
    }

    /// Remove one toast and cancel its timer
    pub fn dismiss(&self, id: Uuid) {
        let removed = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(handle) = inner.timers.remove(&id) {
                handle.abort();
            }
            let before = inner.toasts.len();
            inner.toasts.retain(|toast| toast.id != id);
            inner.toasts.len() != before
        };
        if removed {
            self.notify();
        }
    }

    /// Remove every toast and cancel all timers
    pub fn dismiss_all(&self) {
        let removed = {
            let mut inner = self.inner.lock().unwrap();
            for (_, handle) in inner.timers.drain() {
                handle.abort();
            }
            let had_any = !inner.toasts.is_empty();
            inner.toasts.clear();
            had_any
        };
        if removed {
            self.notify();
        }
    }

    pub fn success(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push(title, description, ToastVariant::Success)
    }

    pub fn error(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push(title, description, ToastVariant::Error)
    }

    pub fn warning(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push(title, description, ToastVariant::Warning)
    }

    pub fn info(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push(title, description, ToastVariant::Info)
    }

    /// Timer expiry path: like dismiss, but the timer entry is already done
    fn expire(&self, id: Uuid) {
        let removed = {
            let mut inner = self.inner.lock().unwrap();
            inner.timers.remove(&id);
            let before = inner.toasts.len();
            inner.toasts.retain(|toast| toast.id != id);
            inner.toasts.len() != before
        };
        if removed {
            self.notify();
        }
    }

    /// Listeners are invoked outside the queue lock so they may call back
    /// into the queue.
    fn notify(&self) {
        let listeners: Vec<Listener> = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener();
        }
    }
}

impl std::fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastQueue")
            .field("toasts", &self.len())
            .finish()
    }
}
