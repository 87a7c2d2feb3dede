//! In-memory store
//!
//! Edges and identities live in plain vectors behind one mutex. Each trait
//! call takes the lock once, so check-and-write sequences are atomic.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use amity_domain::traits::{IdentityStore, RelationshipStore};
use amity_domain::{
    FriendRequest, Identity, IdentityId, PrivacySettings, RequestRole, RequestStatus,
};
use async_trait::async_trait;

use crate::{now_millis, StoreError};

#[derive(Default)]
struct MemoryState {
    /// Kept in insertion order
    requests: Vec<FriendRequest>,
    identities: Vec<Identity>,
}

/// In-memory implementation of the relationship and identity stores
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Register a new identity under a unique handle
    pub fn register_identity(
        &self,
        handle: &str,
        privacy: PrivacySettings,
    ) -> Result<Identity, StoreError> {
        let mut state = self.lock()?;
        if state.identities.iter().any(|i| i.handle == handle) {
            return Err(StoreError::Conflict(format!("handle '{}' is taken", handle)));
        }

        let identity = Identity {
            id: IdentityId::new(),
            handle: handle.to_string(),
            privacy,
        };
        state.identities.push(identity.clone());
        Ok(identity)
    }

    /// Replace the privacy settings of an identity
    pub fn update_privacy(&self, id: IdentityId, privacy: PrivacySettings) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let identity = state
            .identities
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("identity {}", id)))?;
        identity.privacy = privacy;
        Ok(())
    }

    /// Number of stored requests, any status
    pub fn request_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.requests.len())
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    type Error = StoreError;

    async fn create_request(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error> {
        let request = FriendRequest::pending(requester, requested, now_millis())
            .ok_or_else(|| StoreError::InvalidArgument("cannot befriend oneself".to_string()))?;

        let mut state = self.lock()?;
        if state.requests.iter().any(|r| r.connects(requester, requested)) {
            return Err(StoreError::Conflict(format!(
                "an active request already relates {} and {}",
                requester, requested
            )));
        }
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_edge(
        &self,
        a: IdentityId,
        b: IdentityId,
        status: Option<RequestStatus>,
    ) -> Result<Option<FriendRequest>, Self::Error> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .find(|r| r.connects(a, b) && status.is_none_or(|s| r.status == s))
            .cloned())
    }

    async fn find_by_role(
        &self,
        role: RequestRole,
        id: IdentityId,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, Self::Error> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.party(role) == id && r.status == status)
            .cloned()
            .collect())
    }

    async fn accept(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error> {
        let mut state = self.lock()?;
        let request = state
            .requests
            .iter_mut()
            .find(|r| {
                r.requester == requester
                    && r.requested == requested
                    && r.status == RequestStatus::Pending
            })
            .ok_or_else(|| {
                StoreError::NotFound(format!("pending request {} -> {}", requester, requested))
            })?;

        request.accept(now_millis());
        Ok(request.clone())
    }

    async fn deny(&self, requester: IdentityId, requested: IdentityId) -> Result<(), Self::Error> {
        let mut state = self.lock()?;
        let position = state
            .requests
            .iter()
            .position(|r| {
                r.requester == requester
                    && r.requested == requested
                    && r.status == RequestStatus::Pending
            })
            .ok_or_else(|| {
                StoreError::NotFound(format!("pending request {} -> {}", requester, requested))
            })?;

        state.requests.remove(position);
        Ok(())
    }

    async fn friends_of(&self, id: IdentityId) -> Result<Vec<IdentityId>, Self::Error> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Accepted)
            .filter_map(|r| r.counterpart(id))
            .collect())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    type Error = StoreError;

    async fn resolve_by_handle(&self, handle: &str) -> Result<Option<IdentityId>, Self::Error> {
        let state = self.lock()?;
        Ok(state.identities.iter().find(|i| i.handle == handle).map(|i| i.id))
    }

    async fn privacy_settings(&self, id: IdentityId) -> Result<PrivacySettings, Self::Error> {
        let state = self.lock()?;
        state
            .identities
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.privacy)
            .ok_or_else(|| StoreError::NotFound(format!("identity {}", id)))
    }

    async fn exists_all(&self, ids: &[IdentityId]) -> Result<bool, Self::Error> {
        let state = self.lock()?;
        let known: HashSet<IdentityId> = state.identities.iter().map(|i| i.id).collect();
        Ok(ids.iter().all(|id| known.contains(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_either_direction() {
        let store = MemoryStore::new();
        let (a, b) = (IdentityId::new(), IdentityId::new());

        let created = store.create_request(a, b).await.unwrap();
        let found = store.find_edge(b, a, None).await.unwrap();

        assert_eq!(found, Some(created));
        assert!(store.find_edge(a, b, Some(RequestStatus::Accepted)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_request_conflicts() {
        let store = MemoryStore::new();
        let (a, b) = (IdentityId::new(), IdentityId::new());

        store.create_request(a, b).await.unwrap();
        assert!(matches!(store.create_request(b, a).await, Err(StoreError::Conflict(_))));
        assert_eq!(store.request_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_accept_requires_exact_direction() {
        let store = MemoryStore::new();
        let (a, b) = (IdentityId::new(), IdentityId::new());

        store.create_request(a, b).await.unwrap();
        assert!(matches!(store.accept(b, a).await, Err(StoreError::NotFound(_))));

        let accepted = store.accept(a, b).await.unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert!(accepted.date_accepted.is_some());
    }

    #[tokio::test]
    async fn test_deny_removes_edge() {
        let store = MemoryStore::new();
        let (a, b) = (IdentityId::new(), IdentityId::new());

        store.create_request(a, b).await.unwrap();
        store.deny(a, b).await.unwrap();

        assert_eq!(store.request_count().unwrap(), 0);
        assert!(matches!(store.deny(a, b).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_identity_lookups() {
        let store = MemoryStore::new();
        let alice = store.register_identity("alice@example.com", PrivacySettings::default()).unwrap();

        assert_eq!(store.resolve_by_handle("alice@example.com").await.unwrap(), Some(alice.id));
        assert_eq!(store.resolve_by_handle("nobody@example.com").await.unwrap(), None);
        assert!(store.exists_all(&[alice.id]).await.unwrap());
        assert!(!store.exists_all(&[alice.id, IdentityId::new()]).await.unwrap());
        assert!(matches!(
            store.register_identity("alice@example.com", PrivacySettings::default()),
            Err(StoreError::Conflict(_))
        ));
    }
}
