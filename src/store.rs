//! Top-level entry point that owns the state tree, persists it after every
//! mutation, and broadcasts the result to subscribers.
//!
//! The store is opened via [`StateStoreBuilder`], which loads the stored
//! blob from a [`BlobStore`] backend or falls back to the compiled-in
//! defaults.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::watch;

use crate::error::StateError;
use crate::model::{AppState, Notification, Role, Transaction, TransactionKind};
use crate::path::{get_path, set_path};
use crate::snapshot;
use crate::storage::{APP_STATE_KEY, BlobStore};
use crate::subscription::{SubscriptionId, Subscribers};

/// What to do when the stored blob cannot be decoded at open time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStatePolicy {
    /// Log a warning and start from [`AppState::initial`]. The corrupt blob
    /// is overwritten on the next successful mutation.
    #[default]
    FallbackToDefault,
    /// Fail [`StateStoreBuilder::open`] with the decode error
    /// ([`StateError::Corrupt`] or [`StateError::InvalidValue`]).
    Fail,
}

/// Configuration for a [`StateStore`].
///
/// # Examples
///
/// ```
/// use talentsphere_state::{CorruptStatePolicy, StoreConfig};
///
/// let config = StoreConfig {
///     corrupt_policy: CorruptStatePolicy::Fail,
///     ..StoreConfig::default()
/// };
/// assert_eq!(config.key, "talentsphere_app_state");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend key the state blob is stored under.
    ///
    /// Default: `"talentsphere_app_state"`.
    pub key: String,

    /// Handling of undecodable stored state.
    ///
    /// Default: [`CorruptStatePolicy::FallbackToDefault`].
    pub corrupt_policy: CorruptStatePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: APP_STATE_KEY.to_owned(),
            corrupt_policy: CorruptStatePolicy::default(),
        }
    }
}

thread_local! {
    /// Address of the store whose observers are running on this thread, or
    /// zero.
    static NOTIFYING: Cell<usize> = const { Cell::new(0) };
}

/// Marks a store as notifying for the current thread until dropped.
struct NotifyScope {
    previous: usize,
}

impl NotifyScope {
    fn enter(store: usize) -> Self {
        Self {
            previous: NOTIFYING.replace(store),
        }
    }
}

impl Drop for NotifyScope {
    fn drop(&mut self) {
        NOTIFYING.set(self.previous);
    }
}

/// Mutable half of the store, guarded by a single mutex.
struct Inner {
    state: AppState,
    subscribers: Subscribers,
}

/// The application state store.
///
/// Owns the single state tree. Every mutation ([`update`](StateStore::update),
/// [`modify`](StateStore::modify), [`reset`](StateStore::reset) and the typed
/// setters) runs under one lock and then:
///
/// 1. serializes and saves the whole tree to the backend,
/// 2. invokes every subscriber once, in registration order.
///
/// Before saving, the new tree is checked with [`AppState::validate`]. If
/// the check or the save fails, the in-memory tree is rolled back, no
/// subscriber is notified, and the error is returned.
///
/// Observers run while the lock is held and must not call back into the
/// store. Debug builds panic on such a call instead of deadlocking.
///
/// `Clone` is cheap -- all internal state is `Arc`-wrapped.
#[derive(Clone)]
pub struct StateStore {
    backend: Arc<dyn BlobStore>,
    key: Arc<str>,
    inner: Arc<Mutex<Inner>>,
}

// Manual `Debug` because the backend is a trait object and taking the lock
// here could deadlock inside an observer.
impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl StateStore {
    /// Create a builder for a store persisted through `backend`.
    pub fn builder(backend: impl BlobStore) -> StateStoreBuilder {
        StateStoreBuilder::new(backend)
    }

    /// Open a store with the default [`StoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Storage`] if the backend read fails.
    pub fn open(backend: impl BlobStore) -> Result<Self, StateError> {
        Self::builder(backend).open()
    }

    /// The backend key this store persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns an owned copy of the current state.
    pub fn state(&self) -> AppState {
        self.lock().state.clone()
    }

    /// Run `f` against the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock().state)
    }

    /// Resolve a dotted path against the current state.
    ///
    /// Returns `None` if the path does not resolve.
    pub fn get(&self, path: &str) -> Option<Value> {
        let tree = serde_json::to_value(&self.lock().state).ok()?;
        get_path(&tree, path).cloned()
    }

    /// Replace the value at a dotted path, persist, and broadcast.
    ///
    /// # Arguments
    ///
    /// * `path` - Dotted path into the serialized tree, e.g. `"user.role"`
    ///   or `"notifications.0.read"`.
    /// * `value` - The new value. It must fit the typed tree at that slot.
    ///
    /// # Errors
    ///
    /// - [`StateError::InvalidPath`] if the path does not resolve.
    /// - [`StateError::InvalidValue`] if the value does not fit the tree or
    ///   breaks a range constraint (e.g. `user.stats.trustQuotient` above
    ///   100, a negative transaction amount).
    /// - [`StateError::Storage`] if the save is rejected.
    ///
    /// The tree is unchanged after any error.
    pub fn update(&self, path: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let mut inner = self.lock();

        let mut tree = serde_json::to_value(&inner.state)
            .map_err(|e| StateError::invalid_value(path, e.to_string()))?;
        set_path(&mut tree, path, value.into())?;
        let next: AppState = serde_json::from_value(tree)
            .map_err(|e| StateError::invalid_value(path, e.to_string()))?;

        let previous = std::mem::replace(&mut inner.state, next);
        self.commit(&mut inner, previous)?;
        tracing::debug!(key = %self.key, path, "state updated");
        Ok(())
    }

    /// Apply a typed mutation, persist, and broadcast.
    ///
    /// # Returns
    ///
    /// Whatever `f` returns.
    ///
    /// # Errors
    ///
    /// - [`StateError::InvalidValue`] if the result fails
    ///   [`AppState::validate`].
    /// - [`StateError::Storage`] if the save is rejected.
    ///
    /// The mutation is rolled back after either error.
    pub fn modify<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> Result<R, StateError> {
        let mut inner = self.lock();
        let previous = inner.state.clone();
        let out = f(&mut inner.state);
        self.commit(&mut inner, previous)?;
        Ok(out)
    }

    /// Replace the state with a fresh copy of the defaults, persist, and
    /// broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Storage`] if the save is rejected.
    pub fn reset(&self) -> Result<(), StateError> {
        let mut inner = self.lock();
        let previous = std::mem::replace(&mut inner.state, AppState::initial());
        tracing::info!(key = %self.key, "state reset to defaults");
        self.commit(&mut inner, previous)
    }

    /// Register an observer called after every successful mutation.
    ///
    /// The observer receives the committed tree and must read from that
    /// reference. Calling any method of this store (or a clone of it) from
    /// inside the observer would deadlock; debug builds panic instead.
    ///
    /// # Returns
    ///
    /// A token for [`unsubscribe`](StateStore::unsubscribe).
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&AppState) + Send + 'static,
    {
        self.lock().subscribers.subscribe(Box::new(observer))
    }

    /// Remove an observer.
    ///
    /// # Returns
    ///
    /// `true` if `id` was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.unsubscribe(id)
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Subscribe through a `tokio` watch channel.
    ///
    /// The receiver starts at the current state and observes every later
    /// broadcast. Pass the returned id to
    /// [`unsubscribe`](StateStore::unsubscribe) once the receiver is no
    /// longer needed.
    pub fn watch(&self) -> (SubscriptionId, watch::Receiver<AppState>) {
        let mut inner = self.lock();
        let (tx, rx) = watch::channel(inner.state.clone());
        let id = inner.subscribers.subscribe(Box::new(move |state: &AppState| {
            tx.send_replace(state.clone());
        }));
        (id, rx)
    }

    // -----------------------------------------------------------------------
    // Typed setters
    // -----------------------------------------------------------------------

    /// Switch the user between customer and performer.
    pub fn set_user_role(&self, role: Role) -> Result<(), StateError> {
        self.modify(|state| state.user.role = role)
    }

    /// Rename the user.
    pub fn set_user_name(&self, name: impl Into<String>) -> Result<(), StateError> {
        let name = name.into();
        self.modify(|state| state.user.name = name)
    }

    /// Change the user's membership label.
    pub fn set_user_status(&self, status: impl Into<String>) -> Result<(), StateError> {
        let status = status.into();
        self.modify(|state| state.user.status = status)
    }

    /// Overwrite the wallet balance.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidValue`] for a non-finite balance.
    pub fn set_wallet_balance(&self, balance: f64) -> Result<(), StateError> {
        if !balance.is_finite() {
            return Err(StateError::InvalidValue {
                path: "wallet.balance".into(),
                reason: format!("balance must be finite, got {balance}"),
            });
        }
        self.modify(|state| state.wallet.balance = balance)
    }

    /// Record a wallet transaction and adjust the balance by its amount.
    ///
    /// The transaction is placed first in the list (newest first) with a
    /// generated `tx_` id.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidValue`] if `amount` is negative or not
    /// finite.
    pub fn record_transaction(
        &self,
        kind: TransactionKind,
        amount: f64,
        label: impl Into<String>,
        date: impl Into<String>,
    ) -> Result<Transaction, StateError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(StateError::InvalidValue {
                path: "wallet.transactions".into(),
                reason: format!("amount must be a non-negative number, got {amount}"),
            });
        }

        let tx = Transaction {
            id: format!("tx_{}", uuid::Uuid::new_v4().simple()),
            kind,
            amount,
            label: label.into(),
            date: date.into(),
        };

        let recorded = tx.clone();
        self.modify(move |state| {
            match tx.kind {
                TransactionKind::Incoming => state.wallet.balance += tx.amount,
                TransactionKind::Outgoing => state.wallet.balance -= tx.amount,
            }
            state.wallet.transactions.insert(0, tx);
        })?;
        Ok(recorded)
    }

    /// Add an unread notification at the top of the list.
    pub fn push_notification(
        &self,
        title: impl Into<String>,
        text: impl Into<String>,
        time: impl Into<String>,
    ) -> Result<Notification, StateError> {
        let notification = Notification {
            id: format!("nt_{}", uuid::Uuid::new_v4().simple()),
            title: title.into(),
            text: text.into(),
            time: time.into(),
            read: false,
        };
        let pushed = notification.clone();
        self.modify(move |state| state.notifications.insert(0, notification))?;
        Ok(pushed)
    }

    /// Mark one notification read.
    ///
    /// # Returns
    ///
    /// `false` (and no save or broadcast) if no notification has `id`.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool, StateError> {
        self.modify_if(|state| {
            let notification = state.notifications.iter_mut().find(|n| n.id == id)?;
            notification.read = true;
            Some(())
        })
        .map(|changed| changed.is_some())
    }

    /// Mark every notification read.
    ///
    /// # Returns
    ///
    /// How many notifications changed from unread to read.
    pub fn mark_all_notifications_read(&self) -> Result<usize, StateError> {
        self.modify(|state| {
            let mut changed = 0;
            for notification in state.notifications.iter_mut().filter(|n| !n.read) {
                notification.read = true;
                changed += 1;
            }
            changed
        })
    }

    /// Set an active project's progress, clamped to `0..=100`.
    ///
    /// # Returns
    ///
    /// `false` (and no save or broadcast) if no active project has `id`.
    pub fn set_project_progress(&self, id: &str, progress: u8) -> Result<bool, StateError> {
        self.modify_if(|state| {
            let project = state.active_projects.iter_mut().find(|p| p.id == id)?;
            project.progress = progress.min(100);
            Some(())
        })
        .map(|changed| changed.is_some())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Like [`modify`](StateStore::modify), but `None` from `f` discards the
    /// mutation and skips the save and broadcast.
    fn modify_if<R>(
        &self,
        f: impl FnOnce(&mut AppState) -> Option<R>,
    ) -> Result<Option<R>, StateError> {
        let mut inner = self.lock();
        let previous = inner.state.clone();
        match f(&mut inner.state) {
            Some(out) => {
                self.commit(&mut inner, previous)?;
                Ok(Some(out))
            }
            None => {
                inner.state = previous;
                Ok(None)
            }
        }
    }

    /// Validate, persist, and broadcast the current tree, or roll back to
    /// `previous` if either step fails.
    fn commit(&self, inner: &mut Inner, previous: AppState) -> Result<(), StateError> {
        if let Err(e) = inner.state.validate() {
            tracing::debug!(key = %self.key, error = %e, "rejecting out-of-range state");
            inner.state = previous;
            return Err(e);
        }

        let saved = snapshot::encode(&inner.state)
            .and_then(|blob| self.backend.save(&self.key, &blob).map_err(StateError::from));

        if let Err(e) = saved {
            tracing::error!(key = %self.key, error = %e, "failed to persist state");
            inner.state = previous;
            return Err(e);
        }

        let _scope = NotifyScope::enter(self.addr());
        inner.subscribers.notify(&inner.state);
        Ok(())
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        debug_assert!(
            NOTIFYING.get() != self.addr(),
            "observer called back into the StateStore that is notifying it"
        );
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for configuring and opening a [`StateStore`].
///
/// # Examples
///
/// ```
/// use talentsphere_state::{CorruptStatePolicy, MemoryBlobStore, StateStore};
///
/// let store = StateStore::builder(MemoryBlobStore::new())
///     .key("dashboard_state")
///     .corrupt_policy(CorruptStatePolicy::Fail)
///     .open()
///     .expect("open should succeed");
/// assert_eq!(store.key(), "dashboard_state");
/// ```
pub struct StateStoreBuilder {
    backend: Arc<dyn BlobStore>,
    config: StoreConfig,
}

impl StateStoreBuilder {
    /// Create a builder with the default [`StoreConfig`].
    pub fn new(backend: impl BlobStore) -> Self {
        Self {
            backend: Arc::new(backend),
            config: StoreConfig::default(),
        }
    }

    /// Set the backend key the state is stored under.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    /// Set how undecodable stored state is handled.
    pub fn corrupt_policy(mut self, policy: CorruptStatePolicy) -> Self {
        self.config.corrupt_policy = policy;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the stored state and build the store.
    ///
    /// An absent blob yields the defaults. A corrupt blob yields the
    /// defaults or an error, per [`CorruptStatePolicy`]. Nothing is written
    /// until the first mutation.
    ///
    /// # Errors
    ///
    /// - [`StateError::Storage`] if the backend read fails.
    /// - [`StateError::Corrupt`] or [`StateError::InvalidValue`] under
    ///   [`CorruptStatePolicy::Fail`].
    pub fn open(self) -> Result<StateStore, StateError> {
        let key = self.config.key;
        let state = match self.backend.load(&key)? {
            None => {
                tracing::debug!(key = %key, "no stored state, starting from defaults");
                AppState::initial()
            }
            Some(blob) => match snapshot::decode(&blob) {
                Ok(state) => state,
                Err(e) if self.config.corrupt_policy == CorruptStatePolicy::Fail => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        error = %e,
                        "discarding corrupt stored state, starting from defaults"
                    );
                    AppState::initial()
                }
            },
        };

        Ok(StateStore {
            backend: self.backend,
            key: key.into(),
            inner: Arc::new(Mutex::new(Inner {
                state,
                subscribers: Subscribers::default(),
            })),
        })
    }
}
