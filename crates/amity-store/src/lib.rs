//! Amity Storage Layer
//!
//! Implements the [`RelationshipStore`] and [`IdentityStore`] traits twice:
//!
//! - [`SqliteStore`]: persistent storage on SQLite. The active-pair invariant is
//!   a unique expression index over the unordered pair, and every transition is
//!   a single conditional statement.
//! - [`MemoryStore`]: in-process storage for tests and throwaway sessions.
//!
//! # Examples
//!
//! ```no_run
//! use amity_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for identity and friend request operations
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemoryStore;

use amity_domain::traits::{FailureKind, IdentityStore, RelationshipStore, StoreFailure};
use amity_domain::{
    Audience, FriendRequest, Identity, IdentityId, PrivacySettings, RequestId, RequestRole,
    RequestStatus,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Edge or identity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// An active edge (or identity handle) already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rejected input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store could not be reached (worker failure, poisoned lock)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreFailure for StoreError {
    fn kind(&self) -> FailureKind {
        match self {
            StoreError::NotFound(_) => FailureKind::NotFound,
            StoreError::Conflict(_) => FailureKind::Conflict,
            StoreError::InvalidArgument(_) => FailureKind::InvalidArgument,
            StoreError::Database(e) if is_constraint_violation(e) => FailureKind::Conflict,
            StoreError::Database(_) | StoreError::InvalidData(_) | StoreError::Unavailable(_) => {
                FailureKind::Unavailable
            }
        }
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Current time in milliseconds since Unix epoch
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

const REQUEST_COLUMNS: &str = "id, requester, requested, status, date_sent, date_accepted";

/// SQLite-based implementation of the relationship and identity stores
///
/// The connection sits behind a mutex and every call runs on the blocking
/// thread pool, so the store can be shared across tasks via `Arc`.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use amity_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("amity.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        // Other connections on the same file may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(include_str!("schema.sql"))?;
        tracing::debug!(path = %path.as_ref().display(), "Opened friendship store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store worker failed: {}", e)))?
    }

    /// Register a new identity under a unique handle
    pub async fn register_identity(
        &self,
        handle: &str,
        privacy: PrivacySettings,
    ) -> Result<Identity, StoreError> {
        let identity = Identity {
            id: IdentityId::new(),
            handle: handle.to_string(),
            privacy,
        };
        let row = identity.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO identities (id, handle, profile_audience, search_audience, chat_audience, friend_request_audience)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id_to_bytes(row.id),
                    &row.handle,
                    row.privacy.profile.as_str(),
                    row.privacy.search.as_str(),
                    row.privacy.chat_requests.as_str(),
                    row.privacy.friend_requests.as_str(),
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Conflict(format!("handle '{}' is taken", row.handle))
                } else {
                    StoreError::Database(e)
                }
            })?;
            Ok(())
        })
        .await?;

        Ok(identity)
    }

    /// Replace the privacy settings of an identity
    pub async fn update_privacy(
        &self,
        id: IdentityId,
        privacy: PrivacySettings,
    ) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE identities SET profile_audience = ?2, search_audience = ?3,
                 chat_audience = ?4, friend_request_audience = ?5 WHERE id = ?1",
                params![
                    id_to_bytes(id),
                    privacy.profile.as_str(),
                    privacy.search.as_str(),
                    privacy.chat_requests.as_str(),
                    privacy.friend_requests.as_str(),
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("identity {}", id)));
            }
            Ok(())
        })
        .await
    }

    /// Get an identity by id
    pub async fn get_identity(&self, id: IdentityId) -> Result<Option<Identity>, StoreError> {
        self.with_conn(move |conn| {
            let identity = conn
                .query_row(
                    "SELECT id, handle, profile_audience, search_audience, chat_audience, friend_request_audience
                     FROM identities WHERE id = ?1",
                    params![id_to_bytes(id)],
                    row_to_identity,
                )
                .optional()?;
            Ok(identity)
        })
        .await
    }
}

#[async_trait]
impl RelationshipStore for SqliteStore {
    type Error = StoreError;

    async fn create_request(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error> {
        let request = FriendRequest::pending(requester, requested, now_millis())
            .ok_or_else(|| StoreError::InvalidArgument("cannot befriend oneself".to_string()))?;
        let row = request.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO friend_requests (id, requester, requested, status, date_sent, date_accepted)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
                params![
                    request_id_to_bytes(row.id),
                    id_to_bytes(row.requester),
                    id_to_bytes(row.requested),
                    row.status.as_str(),
                    row.date_sent as i64,
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Conflict(format!(
                        "an active request already relates {} and {}",
                        row.requester, row.requested
                    ))
                } else {
                    StoreError::Database(e)
                }
            })?;
            Ok(())
        })
        .await?;

        Ok(request)
    }

    async fn find_edge(
        &self,
        a: IdentityId,
        b: IdentityId,
        status: Option<RequestStatus>,
    ) -> Result<Option<FriendRequest>, Self::Error> {
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM friend_requests
                 WHERE ((requester = ?1 AND requested = ?2) OR (requester = ?2 AND requested = ?1))
                 AND (?3 IS NULL OR status = ?3)
                 ORDER BY seq LIMIT 1",
                REQUEST_COLUMNS
            );
            let edge = conn
                .query_row(
                    &sql,
                    params![id_to_bytes(a), id_to_bytes(b), status.map(|s| s.as_str())],
                    row_to_request,
                )
                .optional()?;
            Ok(edge)
        })
        .await
    }

    async fn find_by_role(
        &self,
        role: RequestRole,
        id: IdentityId,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, Self::Error> {
        self.with_conn(move |conn| {
            let column = match role {
                RequestRole::Requester => "requester",
                RequestRole::Requested => "requested",
            };
            let sql = format!(
                "SELECT {} FROM friend_requests WHERE {} = ?1 AND status = ?2 ORDER BY seq",
                REQUEST_COLUMNS, column
            );

            let mut stmt = conn.prepare(&sql)?;
            let edges = stmt
                .query_map(params![id_to_bytes(id), status.as_str()], row_to_request)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(edges)
        })
        .await
    }

    async fn accept(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error> {
        self.with_conn(move |conn| {
            let sql = format!(
                "UPDATE friend_requests SET status = 'accepted', date_accepted = ?3
                 WHERE requester = ?1 AND requested = ?2 AND status = 'pending'
                 RETURNING {}",
                REQUEST_COLUMNS
            );
            conn.query_row(
                &sql,
                params![id_to_bytes(requester), id_to_bytes(requested), now_millis() as i64],
                row_to_request,
            )
            .optional()?
            .ok_or_else(|| {
                StoreError::NotFound(format!("pending request {} -> {}", requester, requested))
            })
        })
        .await
    }

    async fn deny(&self, requester: IdentityId, requested: IdentityId) -> Result<(), Self::Error> {
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM friend_requests
                 WHERE requester = ?1 AND requested = ?2 AND status = 'pending'",
                params![id_to_bytes(requester), id_to_bytes(requested)],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!(
                    "pending request {} -> {}",
                    requester, requested
                )));
            }
            Ok(())
        })
        .await
    }

    async fn friends_of(&self, id: IdentityId) -> Result<Vec<IdentityId>, Self::Error> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT requester, requested FROM friend_requests
                 WHERE status = 'accepted' AND (requester = ?1 OR requested = ?1)
                 ORDER BY seq",
            )?;

            let friends = stmt
                .query_map(params![id_to_bytes(id)], |row| {
                    let requester = bytes_column(row, 0)?;
                    let requested = bytes_column(row, 1)?;
                    Ok(if requester == id { requested } else { requester })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(friends)
        })
        .await
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    type Error = StoreError;

    async fn resolve_by_handle(&self, handle: &str) -> Result<Option<IdentityId>, Self::Error> {
        let handle = handle.to_string();
        self.with_conn(move |conn| {
            let id = conn
                .query_row(
                    "SELECT id FROM identities WHERE handle = ?1",
                    params![handle],
                    |row| bytes_column(row, 0),
                )
                .optional()?;
            Ok(id)
        })
        .await
    }

    async fn privacy_settings(&self, id: IdentityId) -> Result<PrivacySettings, Self::Error> {
        self.get_identity(id)
            .await?
            .map(|identity| identity.privacy)
            .ok_or_else(|| StoreError::NotFound(format!("identity {}", id)))
    }

    async fn exists_all(&self, ids: &[IdentityId]) -> Result<bool, Self::Error> {
        let unique: Vec<Vec<u8>> = ids
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .map(id_to_bytes)
            .collect();
        if unique.is_empty() {
            return Ok(true);
        }

        self.with_conn(move |conn| {
            let placeholders = vec!["?"; unique.len()].join(", ");
            let sql = format!("SELECT COUNT(*) FROM identities WHERE id IN ({})", placeholders);
            let count: i64 =
                conn.query_row(&sql, rusqlite::params_from_iter(unique.iter()), |row| row.get(0))?;
            Ok(count as usize == unique.len())
        })
        .await
    }
}

/// Convert IdentityId to bytes for storage
fn id_to_bytes(id: IdentityId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

fn request_id_to_bytes(id: RequestId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

/// Convert stored bytes back to a u128
fn bytes_to_value(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for an id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn conversion_error(idx: usize, ty: rusqlite::types::Type, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

fn bytes_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<IdentityId> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes_to_value(&bytes)
        .map(IdentityId::from_value)
        .map_err(|e| conversion_error(idx, rusqlite::types::Type::Blob, e))
}

fn audience_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Audience> {
    let name: String = row.get(idx)?;
    Audience::parse(&name).ok_or_else(|| {
        conversion_error(
            idx,
            rusqlite::types::Type::Text,
            StoreError::InvalidData(format!("Unknown audience: {}", name)),
        )
    })
}

fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<FriendRequest> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = bytes_to_value(&id_bytes)
        .map(RequestId::from_value)
        .map_err(|e| conversion_error(0, rusqlite::types::Type::Blob, e))?;

    let status_str: String = row.get(3)?;
    let status = RequestStatus::parse(&status_str).ok_or_else(|| {
        conversion_error(
            3,
            rusqlite::types::Type::Text,
            StoreError::InvalidData(format!("Unknown request status: {}", status_str)),
        )
    })?;

    let date_accepted: Option<i64> = row.get(5)?;

    Ok(FriendRequest {
        id,
        requester: bytes_column(row, 1)?,
        requested: bytes_column(row, 2)?,
        status,
        date_sent: row.get::<_, i64>(4)? as u64,
        date_accepted: date_accepted.map(|t| t as u64),
    })
}

fn row_to_identity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: bytes_column(row, 0)?,
        handle: row.get(1)?,
        privacy: PrivacySettings {
            profile: audience_column(row, 2)?,
            search: audience_column(row, 3)?,
            chat_requests: audience_column(row, 4)?,
            friend_requests: audience_column(row, 5)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_roundtrip() {
        let id = IdentityId::new();
        let bytes = id_to_bytes(id);
        assert_eq!(IdentityId::from_value(bytes_to_value(&bytes).unwrap()), id);
    }

    #[test]
    fn test_bytes_wrong_length() {
        assert!(matches!(bytes_to_value(&[0u8; 8]), Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(StoreError::NotFound("x".into()).kind(), FailureKind::NotFound);
        assert_eq!(StoreError::Conflict("x".into()).kind(), FailureKind::Conflict);
        assert_eq!(StoreError::InvalidData("x".into()).kind(), FailureKind::Unavailable);
        assert_eq!(
            StoreError::Database(rusqlite::Error::InvalidQuery).kind(),
            FailureKind::Unavailable
        );
    }
}
