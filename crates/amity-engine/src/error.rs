//! Error types for friendship operations

use std::fmt;

use amity_domain::traits::{FailureKind, StoreFailure};
use thiserror::Error;

/// Boxed store error, kept verbatim as the source
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a friend request could not be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A Pending request already relates the pair
    DuplicatePending,

    /// The pair are already friends
    AlreadyFriends,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::DuplicatePending => f.write_str("a friend request is already pending"),
            ConflictKind::AlreadyFriends => f.write_str("already friends"),
        }
    }
}

/// Errors returned by the friendship engine
///
/// Every variant names the operation that was being attempted.
#[derive(Error, Debug)]
pub enum FriendshipError {
    /// No such edge or identity
    #[error("{operation}: {what} does not exist")]
    NotFound {
        /// Operation being attempted
        operation: &'static str,
        /// What was missing
        what: String,
    },

    /// Duplicate pending request or already friends
    #[error("{operation}: {kind}")]
    Conflict {
        /// Operation being attempted
        operation: &'static str,
        /// Which conflict
        kind: ConflictKind,
    },

    /// The requested identity's privacy settings forbid the action
    #[error("{operation}: not permitted by privacy settings")]
    NotPermitted {
        /// Operation being attempted
        operation: &'static str,
    },

    /// Self-request or malformed input
    #[error("{operation}: invalid argument: {message}")]
    InvalidArgument {
        /// Operation being attempted
        operation: &'static str,
        /// What was wrong
        message: String,
    },

    /// Transport or persistence failure; never retried by the engine
    #[error("{operation}: store unavailable: {source}")]
    StoreUnavailable {
        /// Operation being attempted
        operation: &'static str,
        /// Underlying store error
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the operation
    #[error("{operation}: cancelled")]
    Cancelled {
        /// Operation being attempted
        operation: &'static str,
    },
}

impl FriendshipError {
    /// Wrap a store error with the operation it interrupted
    pub(crate) fn from_store<E: StoreFailure>(operation: &'static str, error: E) -> Self {
        match error.kind() {
            FailureKind::NotFound => FriendshipError::NotFound {
                operation,
                what: error.to_string(),
            },
            FailureKind::InvalidArgument => FriendshipError::InvalidArgument {
                operation,
                message: error.to_string(),
            },
            FailureKind::Conflict => FriendshipError::Conflict {
                operation,
                kind: ConflictKind::DuplicatePending,
            },
            FailureKind::Unavailable => FriendshipError::StoreUnavailable {
                operation,
                source: Box::new(error),
            },
        }
    }

    /// Like [`from_store`](Self::from_store), reporting NotFound as a missing request
    pub(crate) fn from_request_store<E: StoreFailure>(operation: &'static str, error: E) -> Self {
        match error.kind() {
            FailureKind::NotFound => FriendshipError::NotFound {
                operation,
                what: "request".to_string(),
            },
            _ => Self::from_store(operation, error),
        }
    }

    /// Name of the operation that failed
    pub fn operation(&self) -> &'static str {
        match self {
            FriendshipError::NotFound { operation, .. }
            | FriendshipError::Conflict { operation, .. }
            | FriendshipError::NotPermitted { operation }
            | FriendshipError::InvalidArgument { operation, .. }
            | FriendshipError::StoreUnavailable { operation, .. }
            | FriendshipError::Cancelled { operation } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("{message}")]
    struct TestStoreError {
        kind: FailureKind,
        message: &'static str,
    }

    impl StoreFailure for TestStoreError {
        fn kind(&self) -> FailureKind {
            self.kind
        }
    }

    #[test]
    fn test_request_not_found_message() {
        let error = FriendshipError::from_request_store(
            "accept_request",
            TestStoreError {
                kind: FailureKind::NotFound,
                message: "pending request a -> b",
            },
        );
        assert_eq!(error.to_string(), "accept_request: request does not exist");
    }

    #[test]
    fn test_unavailable_keeps_source() {
        let error = FriendshipError::from_store(
            "get_friends",
            TestStoreError {
                kind: FailureKind::Unavailable,
                message: "disk I/O error",
            },
        );
        assert_eq!(error.operation(), "get_friends");
        assert_eq!(error.to_string(), "get_friends: store unavailable: disk I/O error");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_conflict_display() {
        let error = FriendshipError::Conflict {
            operation: "send_request",
            kind: ConflictKind::AlreadyFriends,
        };
        assert_eq!(error.to_string(), "send_request: already friends");
    }
}
