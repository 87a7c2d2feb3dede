//! The friendship engine
//!
//! Owns the request state machine (absent -> Pending -> Accepted, or Pending
//! -> absent on deny) and answers relationship queries by reading accepted
//! edges back from the relationship store.

use std::future::Future;
use std::sync::Arc;

use amity_domain::privacy::can_receive_friend_request;
use amity_domain::relationship::classify;
use amity_domain::traits::{FailureKind, IdentityStore, RelationshipStore, StoreFailure};
use amity_domain::{FriendRequest, IdentityId, Relationship, RequestRole, RequestStatus};

use crate::config::ConfigError;
use crate::error::ConflictKind;
use crate::{traversal, EngineConfig, FriendshipError};

/// Result of a friend request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The request was created in Pending
    Sent(FriendRequest),

    /// The handle did not resolve to any identity
    NoSuchIdentity,
}

/// Friendship engine over a relationship store and an identity store
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use amity_engine::{EngineConfig, FriendshipEngine};
/// use amity_store::SqliteStore;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(SqliteStore::new("amity.db")?);
/// let engine = FriendshipEngine::new(store.clone(), store, EngineConfig::default())?;
///
/// let alice = amity_domain::IdentityId::new();
/// let friends = engine.get_friends(alice).await?;
/// # Ok(())
/// # }
/// ```
pub struct FriendshipEngine<R, I> {
    relationships: Arc<R>,
    identities: Arc<I>,
    config: EngineConfig,
}

impl<R, I> FriendshipEngine<R, I>
where
    R: RelationshipStore + 'static,
    I: IdentityStore,
{
    /// Create an engine over the given stores
    pub fn new(
        relationships: Arc<R>,
        identities: Arc<I>,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            relationships,
            identities,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Send a friend request from `requester` to the identity behind `requested_handle`
    ///
    /// An unknown handle is not an error: it yields [`SendOutcome::NoSuchIdentity`].
    pub async fn send_request(
        &self,
        requester: IdentityId,
        requested_handle: &str,
    ) -> Result<SendOutcome, FriendshipError> {
        const OP: &str = "send_request";

        let Some(requested) = self
            .identities
            .resolve_by_handle(requested_handle)
            .await
            .map_err(|e| FriendshipError::from_store(OP, e))?
        else {
            tracing::debug!(%requester, handle = requested_handle, "Friend request to unknown handle");
            return Ok(SendOutcome::NoSuchIdentity);
        };

        if requester == requested {
            return Err(FriendshipError::InvalidArgument {
                operation: OP,
                message: "cannot send a friend request to oneself".to_string(),
            });
        }

        if let Some(existing) = self.edge(OP, requester, requested, None).await? {
            return Err(FriendshipError::Conflict {
                operation: OP,
                kind: conflict_kind(&existing),
            });
        }

        let privacy = self
            .identities
            .privacy_settings(requested)
            .await
            .map_err(|e| FriendshipError::from_store(OP, e))?;
        if !can_receive_friend_request(&privacy) {
            tracing::warn!(%requester, %requested, "Friend request blocked by privacy settings");
            return Err(FriendshipError::NotPermitted { operation: OP });
        }

        let request = match self.relationships.create_request(requester, requested).await {
            Ok(request) => request,
            Err(e) if e.kind() == FailureKind::Conflict => {
                // Lost a race with a concurrent request for the same pair
                let kind = self
                    .edge(OP, requester, requested, None)
                    .await?
                    .map(|existing| conflict_kind(&existing))
                    .unwrap_or(ConflictKind::DuplicatePending);
                return Err(FriendshipError::Conflict { operation: OP, kind });
            }
            Err(e) => return Err(FriendshipError::from_store(OP, e)),
        };

        tracing::info!(request = %request.id, %requester, %requested, "Friend request sent");
        Ok(SendOutcome::Sent(request))
    }

    /// Accept the Pending request `requester -> requested`
    pub async fn accept_request(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, FriendshipError> {
        let request = self
            .relationships
            .accept(requester, requested)
            .await
            .map_err(|e| FriendshipError::from_request_store("accept_request", e))?;

        tracing::info!(request = %request.id, %requester, %requested, "Friend request accepted");
        Ok(request)
    }

    /// Deny (delete) the Pending request `requester -> requested`
    pub async fn deny_request(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<(), FriendshipError> {
        self.relationships
            .deny(requester, requested)
            .await
            .map_err(|e| FriendshipError::from_request_store("deny_request", e))?;

        tracing::info!(%requester, %requested, "Friend request denied");
        Ok(())
    }

    /// Pending requests sent by `id`
    pub async fn get_sent_requests(
        &self,
        id: IdentityId,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        self.pending("get_sent_requests", RequestRole::Requester, id).await
    }

    /// Pending requests sent to `id`
    pub async fn get_received_requests(
        &self,
        id: IdentityId,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        self.pending("get_received_requests", RequestRole::Requested, id).await
    }

    /// Pending requests sent by `id`, followed by those sent to it
    pub async fn get_requests(&self, id: IdentityId) -> Result<Vec<FriendRequest>, FriendshipError> {
        let mut requests = self.pending("get_requests", RequestRole::Requester, id).await?;
        requests.extend(self.pending("get_requests", RequestRole::Requested, id).await?);
        Ok(requests)
    }

    /// Identities connected to `id` by an Accepted request
    ///
    /// Order follows the underlying edges and carries no meaning.
    pub async fn get_friends(&self, id: IdentityId) -> Result<Vec<IdentityId>, FriendshipError> {
        self.friends("get_friends", id).await
    }

    /// Identities exactly two hops from `id`
    ///
    /// Never includes `id` itself or any direct friend; each identity appears once.
    pub async fn get_friends_of_friends(
        &self,
        id: IdentityId,
    ) -> Result<Vec<IdentityId>, FriendshipError> {
        const OP: &str = "get_friends_of_friends";

        self.ensure_identities(OP, &[id]).await?;
        let friends = self.friends(OP, id).await?;
        tracing::debug!(identity = %id, friends = friends.len(), "Expanding friends of friends");

        let result = traversal::friends_of_friends(
            Arc::clone(&self.relationships),
            id,
            &friends,
            self.config.fan_out_limit,
        )
        .await?;

        tracing::debug!(identity = %id, found = result.len(), "Friends of friends resolved");
        Ok(result)
    }

    /// [`get_friends_of_friends`](Self::get_friends_of_friends), abandoned when `cancel` resolves
    ///
    /// All reads still in flight are aborted and no partial result is returned.
    pub async fn get_friends_of_friends_until<C>(
        &self,
        id: IdentityId,
        cancel: C,
    ) -> Result<Vec<IdentityId>, FriendshipError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            result = self.get_friends_of_friends(id) => result,
            _ = cancel => {
                tracing::debug!(identity = %id, "Friends-of-friends traversal cancelled");
                Err(FriendshipError::Cancelled { operation: "get_friends_of_friends" })
            }
        }
    }

    /// Whether `a` and `b` are connected by an Accepted request
    pub async fn is_friend(&self, a: IdentityId, b: IdentityId) -> Result<bool, FriendshipError> {
        Ok(self
            .edge("is_friend", a, b, Some(RequestStatus::Accepted))
            .await?
            .is_some())
    }

    /// Whether `a` and `b` share a mutual friend without being friends
    pub async fn is_friend_of_friends(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<bool, FriendshipError> {
        Ok(self.relationship("is_friend_of_friends", a, b).await? == Relationship::FriendsOfFriends)
    }

    /// Classify how `b` relates to `a`
    pub async fn get_relationship(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<Relationship, FriendshipError> {
        const OP: &str = "get_relationship";

        self.ensure_identities(OP, &[a, b]).await?;
        self.relationship(OP, a, b).await
    }

    /// Friends shared by `a` and `b`, in `a`'s friend order
    pub async fn get_mutual_friends(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<Vec<IdentityId>, FriendshipError> {
        const OP: &str = "get_mutual_friends";

        self.ensure_identities(OP, &[a, b]).await?;
        let a_friends = self.friends(OP, a).await?;
        let b_friends = self.friends(OP, b).await?;

        Ok(a_friends
            .into_iter()
            .filter(|friend| b_friends.contains(friend))
            .collect())
    }

    /// The request relating `a` and `b` in either direction, any status
    pub async fn get_friendship_edge(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<Option<FriendRequest>, FriendshipError> {
        self.edge("get_friendship_edge", a, b, None).await
    }

    /// Whether `a` has a Pending request out to `b`
    pub async fn is_requester_of(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<bool, FriendshipError> {
        Ok(self
            .edge("is_requester_of", a, b, Some(RequestStatus::Pending))
            .await?
            .is_some_and(|edge| edge.requester == a))
    }

    /// Whether `a` has a Pending request in from `b`
    pub async fn is_requested_of(
        &self,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<bool, FriendshipError> {
        Ok(self
            .edge("is_requested_of", a, b, Some(RequestStatus::Pending))
            .await?
            .is_some_and(|edge| edge.requested == a))
    }

    async fn relationship(
        &self,
        operation: &'static str,
        a: IdentityId,
        b: IdentityId,
    ) -> Result<Relationship, FriendshipError> {
        let a_friends = self.friends(operation, a).await?;
        if a_friends.contains(&b) {
            return Ok(Relationship::Friends);
        }

        let b_friends = self.friends(operation, b).await?;
        Ok(classify(&a_friends, b, &b_friends))
    }

    async fn friends(
        &self,
        operation: &'static str,
        id: IdentityId,
    ) -> Result<Vec<IdentityId>, FriendshipError> {
        self.relationships
            .friends_of(id)
            .await
            .map_err(|e| FriendshipError::from_store(operation, e))
    }

    async fn edge(
        &self,
        operation: &'static str,
        a: IdentityId,
        b: IdentityId,
        status: Option<RequestStatus>,
    ) -> Result<Option<FriendRequest>, FriendshipError> {
        self.relationships
            .find_edge(a, b, status)
            .await
            .map_err(|e| FriendshipError::from_store(operation, e))
    }

    async fn pending(
        &self,
        operation: &'static str,
        role: RequestRole,
        id: IdentityId,
    ) -> Result<Vec<FriendRequest>, FriendshipError> {
        self.relationships
            .find_pending(role, id)
            .await
            .map_err(|e| FriendshipError::from_store(operation, e))
    }

    async fn ensure_identities(
        &self,
        operation: &'static str,
        ids: &[IdentityId],
    ) -> Result<(), FriendshipError> {
        if !self.config.validate_identities {
            return Ok(());
        }

        let exist = self
            .identities
            .exists_all(ids)
            .await
            .map_err(|e| FriendshipError::from_store(operation, e))?;
        if !exist {
            return Err(FriendshipError::NotFound {
                operation,
                what: "identity".to_string(),
            });
        }
        Ok(())
    }
}

fn conflict_kind(existing: &FriendRequest) -> ConflictKind {
    match existing.status {
        RequestStatus::Pending => ConflictKind::DuplicatePending,
        RequestStatus::Accepted => ConflictKind::AlreadyFriends,
    }
}
