//! Durable blob storage trait and built-in backends.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Storage key under which the whole application state is persisted.
pub const APP_STATE_KEY: &str = "talentsphere_app_state";

/// A key-value persistence backend holding one serialized blob per key.
///
/// # Contract
///
/// - [`load`](BlobStore::load) returns `Ok(None)` when nothing is stored
///   under the key. Any other failure is an `io::Error`.
/// - [`save`](BlobStore::save) overwrites the entire blob unconditionally.
///   There is no transactionality across keys or calls.
pub trait BlobStore: Send + Sync + 'static {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the backend rejects the write (quota
    /// exceeded, read-only media, disabled storage).
    fn save(&self, key: &str, blob: &str) -> io::Result<()>;
}

/// Stores each key as a JSON file inside a base directory.
///
/// The layout is flat:
/// ```text
/// <base_dir>/
///     talentsphere_app_state.json
/// ```
///
/// Writes go to `<key>.json.tmp` first and are renamed into place, so a
/// crash mid-write never leaves a truncated blob behind.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    base_dir: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `base_dir`.
    ///
    /// The directory is created lazily on the first [`save`](BlobStore::save).
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the root directory of this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the file path backing `key`.
    ///
    /// # Returns
    ///
    /// `<base_dir>/<key>.json`
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.blob_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, blob: &str) -> io::Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.blob_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, blob)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// In-process backend, mainly for tests and embedding.
///
/// `Clone` is cheap and clones share the same underlying map, so a test
/// can keep one handle to inspect what the store wrote through another.
/// An optional quota caps the byte length of any single blob, mirroring
/// a browser's storage quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryBlobStore {
    /// Create an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects blobs longer than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            blobs: Arc::default(),
            quota: Some(bytes),
        }
    }

    /// Seed a blob directly, bypassing the quota.
    pub fn insert(&self, key: impl Into<String>, blob: impl Into<String>) {
        self.lock().insert(key.into(), blob.into());
    }

    /// Return a copy of the blob currently stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> io::Result<()> {
        if let Some(quota) = self.quota
            && blob.len() > quota
        {
            return Err(io::Error::new(
                io::ErrorKind::StorageFull,
                format!("blob of {} bytes exceeds quota of {quota} bytes", blob.len()),
            ));
        }
        self.lock().insert(key.to_owned(), blob.to_owned());
        Ok(())
    }
}
