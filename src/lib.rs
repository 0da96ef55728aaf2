//! Persisted, observable application state for the TalentSphere marketplace.
//!
//! A [`StateStore`] owns one [`AppState`] tree, saves it through a
//! [`BlobStore`] after every mutation, and notifies subscribers in
//! registration order. The [`feed`] and [`dashboard`] modules provide the
//! read-only marketplace catalogue and the dashboard read model.

pub mod dashboard;
mod error;
pub mod feed;
mod model;
pub mod path;
pub mod snapshot;
mod storage;
mod store;
mod subscription;

pub use error::StateError;
pub use model::{
    ActiveProject, AppState, ChatSummary, Messages, Notification, Role, Transaction,
    TransactionKind, User, UserStats, Wallet,
};
pub use storage::{APP_STATE_KEY, BlobStore, FileBlobStore, MemoryBlobStore};
pub use store::{CorruptStatePolicy, StateStore, StateStoreBuilder, StoreConfig};
pub use subscription::{Observer, SubscriptionId};
