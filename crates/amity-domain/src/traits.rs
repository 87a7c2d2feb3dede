//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the friendship engine and
//! storage. Implementations live in other crates (amity-store).

use async_trait::async_trait;

use crate::{FriendRequest, IdentityId, PrivacySettings, RequestRole, RequestStatus};

/// Coarse classification of a store failure
///
/// The engine maps store errors onto its own taxonomy through this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No such edge or identity
    NotFound,

    /// An active edge already relates the pair
    Conflict,

    /// Self-request or malformed input
    InvalidArgument,

    /// Transport or persistence failure
    Unavailable,
}

/// Errors returned by store implementations
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
    /// Classify this error
    fn kind(&self) -> FailureKind;
}

/// Persistence of directed friend requests
///
/// Every mutation is a single atomic conditional write with respect to the
/// edge it touches. Implementations must guarantee that at most one Pending or
/// Accepted edge relates an unordered pair, and that a Pending edge is
/// accepted at most once under concurrent callers.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Create a Pending request
    ///
    /// Fails with `Conflict` if an active edge already relates the pair (in
    /// either direction) and `InvalidArgument` if `requester == requested`.
    async fn create_request(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error>;

    /// Find the edge relating `a` and `b`, ignoring direction
    ///
    /// `None` for `status` matches any status.
    async fn find_edge(
        &self,
        a: IdentityId,
        b: IdentityId,
        status: Option<RequestStatus>,
    ) -> Result<Option<FriendRequest>, Self::Error>;

    /// Edges where `id` occupies `role` and that are in `status`, in insertion order
    async fn find_by_role(
        &self,
        role: RequestRole,
        id: IdentityId,
        status: RequestStatus,
    ) -> Result<Vec<FriendRequest>, Self::Error>;

    /// Pending edges where `id` occupies `role`
    async fn find_pending(
        &self,
        role: RequestRole,
        id: IdentityId,
    ) -> Result<Vec<FriendRequest>, Self::Error> {
        self.find_by_role(role, id, RequestStatus::Pending).await
    }

    /// Accept the Pending edge `requester -> requested`
    ///
    /// Fails with `NotFound` if no Pending edge with that exact direction exists.
    async fn accept(
        &self,
        requester: IdentityId,
        requested: IdentityId,
    ) -> Result<FriendRequest, Self::Error>;

    /// Delete the Pending edge `requester -> requested`
    ///
    /// Fails with `NotFound` if no Pending edge with that exact direction exists.
    async fn deny(&self, requester: IdentityId, requested: IdentityId) -> Result<(), Self::Error>;

    /// Identities connected to `id` by an Accepted edge, in edge insertion order
    async fn friends_of(&self, id: IdentityId) -> Result<Vec<IdentityId>, Self::Error>;
}

/// Lookups against the identity store
///
/// The identity entity is owned elsewhere; the engine only resolves handles,
/// reads privacy settings and checks existence.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Resolve a contact handle to an identity
    async fn resolve_by_handle(&self, handle: &str) -> Result<Option<IdentityId>, Self::Error>;

    /// Privacy settings of an identity; `NotFound` for unknown ids
    async fn privacy_settings(&self, id: IdentityId) -> Result<PrivacySettings, Self::Error>;

    /// Whether every id in `ids` names an existing identity
    async fn exists_all(&self, ids: &[IdentityId]) -> Result<bool, Self::Error>;
}
