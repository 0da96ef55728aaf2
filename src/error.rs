//! Crate-level error type for loading, updating, and persisting state.

/// Error returned by [`StateStore`](crate::StateStore) operations.
///
/// Every fallible operation in the crate reports one of these. Storage and
/// path failures are always surfaced to the caller; corrupt stored state is
/// only surfaced when the store is opened with
/// [`CorruptStatePolicy::Fail`](crate::CorruptStatePolicy::Fail).
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The persistence backend rejected a read or write.
    ///
    /// Covers quota exhaustion, permission failures, and disabled storage.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The stored blob could not be decoded into a state tree.
    #[error("corrupt stored state: {reason}")]
    Corrupt {
        /// Parser or version-check message.
        reason: String,
    },

    /// A dotted path did not resolve against the state tree.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The dotted path as given by the caller.
        path: String,
        /// Which segment failed and why.
        reason: String,
    },

    /// A value does not fit the typed state tree or breaks a range
    /// constraint (percentages above 100, negative amounts).
    #[error("invalid value for `{path}`: {reason}")]
    InvalidValue {
        /// The dotted path holding the rejected value.
        path: String,
        /// Deserialization or range-check message.
        reason: String,
    },
}

impl StateError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_from_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::StorageFull, "quota exceeded");
        let err = StateError::from(io_err);
        assert!(matches!(err, StateError::Storage(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn corrupt_display() {
        let err = StateError::Corrupt {
            reason: "expected value at line 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt stored state: expected value at line 1"
        );
    }

    #[test]
    fn invalid_path_display_names_path() {
        let err = StateError::invalid_path("user.missing.role", "segment `missing` not found");
        assert_eq!(
            err.to_string(),
            "invalid path `user.missing.role`: segment `missing` not found"
        );
    }

    #[test]
    fn invalid_value_display() {
        let err = StateError::InvalidValue {
            path: "wallet.balance".into(),
            reason: "invalid type: string".into(),
        };
        assert!(err.to_string().starts_with("invalid value for `wallet.balance`"));
    }

    // Errors cross thread boundaries through the shared store.
    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<StateError>();
        }
    };
}
