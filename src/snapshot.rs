//! Versioned document format for the persisted state blob.
//!
//! The blob is JSON of the form `{ "version": 1, "state": { ... } }`.
//! Blobs written before versioning existed hold the bare state tree with
//! no envelope; they decode as version 0 and are rewritten with the
//! envelope on the next save.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StateError;
use crate::model::AppState;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// The document persisted under the state key.
///
/// Decoding yields `PersistedState<AppState>`; [`encode`] serializes a
/// borrowed `PersistedState<&AppState>` so the tree is never cloned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState<S = AppState> {
    /// Schema version the `state` was written with.
    pub version: u32,
    /// The full state tree.
    pub state: S,
}

/// Serialize a state tree into a versioned blob.
///
/// # Errors
///
/// Returns [`StateError::Storage`] with `InvalidData` if serialization
/// fails.
pub fn encode(state: &AppState) -> Result<String, StateError> {
    serde_json::to_string_pretty(&PersistedState {
        version: SCHEMA_VERSION,
        state,
    })
    .map_err(|e| StateError::Storage(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Decode a stored blob into a state tree.
///
/// A top-level `version` key selects the envelope; without one the blob is
/// read as a bare legacy tree.
///
/// # Errors
///
/// - [`StateError::Corrupt`] if the blob is not valid JSON, does not match
///   the state schema, or was written by a newer schema version.
/// - [`StateError::InvalidValue`] if the tree decodes but fails
///   [`AppState::validate`].
pub fn decode(blob: &str) -> Result<AppState, StateError> {
    let document: Value = serde_json::from_str(blob).map_err(corrupt)?;

    let state = match document.get("version").map(Value::as_u64) {
        None => {
            tracing::debug!("upgrading unversioned state blob");
            serde_json::from_value::<AppState>(document).map_err(corrupt)?
        }
        Some(None) => {
            return Err(StateError::Corrupt {
                reason: "schema version is not an unsigned integer".into(),
            });
        }
        Some(Some(version)) if version > u64::from(SCHEMA_VERSION) => {
            return Err(StateError::Corrupt {
                reason: format!(
                    "schema version {version} is newer than supported version {SCHEMA_VERSION}"
                ),
            });
        }
        Some(Some(_)) => {
            serde_json::from_value::<PersistedState>(document)
                .map_err(corrupt)?
                .state
        }
    };

    state.validate()?;
    Ok(state)
}

fn corrupt(e: serde_json::Error) -> StateError {
    StateError::Corrupt {
        reason: e.to_string(),
    }
}
