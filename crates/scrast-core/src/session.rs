// ABOUTME: The in-memory recording session and its observable store.
// ABOUTME: Updates replace the whole record and notify subscribers only on change.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle of the supervised recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Stopped,
    Recording,
    Paused,
    /// Termination was requested but the encoder has not exited yet.
    Stopping,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Stopped => "stopped",
            Status::Recording => "recording",
            Status::Paused => "paused",
            Status::Stopping => "stopping",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the recording: what it is doing, for how long, and how much it wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Session {
    pub status: Status,
    pub elapsed_seconds: f64,
    pub byte_count: u64,
}

impl Session {
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }
}

type Handler = Box<dyn Fn() + Send + Sync>;

struct Inner {
    session: Mutex<Session>,
    subscribers: Mutex<Vec<Handler>>,
}

/// Process-wide session state with change notification.
///
/// Cloning yields another handle to the same store. Handlers run synchronously on
/// the thread that called [`SessionStore::update`], in subscription order, so they
/// must be quick and must not call `update` or `subscribe` themselves.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::default()),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Copy of the current session.
    pub fn read(&self) -> Session {
        *lock(&self.inner.session)
    }

    /// Replace the session with `f(current)`. Subscribers are notified only when the
    /// new record differs from the old one. Returns whether anything changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(Session) -> Session,
    {
        {
            let mut current = lock(&self.inner.session);
            let next = f(*current);
            if next == *current {
                return false;
            }
            *current = next;
        }

        for handler in lock(&self.inner.subscribers).iter() {
            handler();
        }
        true
    }

    /// Register a handler for every future change. Subscriptions last for the
    /// lifetime of the store.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        lock(&self.inner.subscribers).push(Box::new(handler));
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.read())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking subscriber must not wedge the store.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_initial_session_is_stopped_and_empty() {
        let store = SessionStore::new();
        let session = store.read();
        assert_eq!(session.status, Status::Stopped);
        assert_eq!(session.elapsed_seconds, 0.0);
        assert_eq!(session.byte_count, 0);
    }

    #[test]
    fn test_update_notifies_on_change() {
        let store = SessionStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.update(|s| s.with_status(Status::Recording)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.read().status, Status::Recording);
    }

    #[test]
    fn test_update_without_change_is_silent() {
        let store = SessionStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.update(|s| s));
        assert!(!store.update(|s| s.with_status(Status::Stopped)));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_any_field_counts_as_change() {
        let store = SessionStore::new();
        assert!(store.update(|s| Session {
            byte_count: 1024,
            ..s
        }));
        assert!(store.update(|s| Session {
            elapsed_seconds: 0.5,
            ..s
        }));
        assert_eq!(store.read().byte_count, 1024);
        assert_eq!(store.read().elapsed_seconds, 0.5);
    }

    #[test]
    fn test_subscribers_run_in_order_and_can_read() {
        let store = SessionStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = order.clone();
            let reader = store.clone();
            store.subscribe(move || {
                order.lock().unwrap().push((id, reader.read().status));
            });
        }

        store.update(|s| s.with_status(Status::Paused));

        let order = order.lock().unwrap();
        assert_eq!(
            *order,
            vec![
                (0, Status::Paused),
                (1, Status::Paused),
                (2, Status::Paused)
            ]
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Recording.to_string(), "recording");
        assert_eq!(Status::Paused.to_string(), "paused");
        assert_eq!(Status::Stopping.to_string(), "stopping");
        assert_eq!(Status::Stopped.to_string(), "stopped");
    }
}
