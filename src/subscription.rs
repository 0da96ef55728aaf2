//! Observer registry notified after every state mutation.

use std::fmt;

use crate::model::AppState;

/// Callback invoked with the current state after each mutation.
///
/// Observers receive a shared reference; they cannot mutate the tree they
/// are shown.
pub type Observer = Box<dyn Fn(&AppState) + Send + 'static>;

/// Opaque token identifying one registration.
///
/// Returned by [`StateStore::subscribe`](crate::StateStore::subscribe) and
/// passed back to [`StateStore::unsubscribe`](crate::StateStore::unsubscribe)
/// when the consuming view is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Registered observers in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a registration. Returns `false` if `id` was not registered.
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    /// Invoke every observer once, in registration order.
    pub(crate) fn notify(&self, state: &AppState) {
        for (_, observer) in &self.observers {
            observer(state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Observer {
        let log = Arc::clone(log);
        Box::new(move |_state: &AppState| log.lock().unwrap().push(tag))
    }

    #[test]
    fn notify_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscribers::default();
        subs.subscribe(recorder(&log, "first"));
        subs.subscribe(recorder(&log, "second"));
        subs.subscribe(recorder(&log, "third"));

        subs.notify(&AppState::initial());

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn ids_are_unique_and_not_reused() {
        let mut subs = Subscribers::default();
        let a = subs.subscribe(Box::new(|_: &AppState| {}));
        assert!(subs.unsubscribe(a));
        let b = subs.subscribe(Box::new(|_: &AppState| {}));
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "sub-1");
    }

    #[test]
    fn unsubscribe_removes_only_that_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut subs = Subscribers::default();
        subs.subscribe(recorder(&log, "kept"));
        let dropped = subs.subscribe(recorder(&log, "dropped"));

        assert!(subs.unsubscribe(dropped));
        assert!(!subs.unsubscribe(dropped), "second removal is a no-op");
        assert_eq!(subs.len(), 1);

        subs.notify(&AppState::initial());
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn observers_see_current_state() {
        let seen = Arc::new(Mutex::new(None));
        let mut subs = Subscribers::default();
        let sink = Arc::clone(&seen);
        subs.subscribe(Box::new(move |state: &AppState| {
            *sink.lock().unwrap() = Some(state.user.name.clone());
        }));

        let mut state = AppState::initial();
        state.user.name = "Jamie".into();
        subs.notify(&state);

        assert_eq!(seen.lock().unwrap().as_deref(), Some("Jamie"));
    }
}
