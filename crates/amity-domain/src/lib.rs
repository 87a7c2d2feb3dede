//! Amity Domain Layer
//!
//! This crate holds the model of friendship between identities: who asked whom,
//! what became of the request, and how two identities relate once the accepted
//! requests are read back as an undirected graph.
//!
//! ## Key Concepts
//!
//! - **Identity**: a participant, referenced by an opaque [`IdentityId`]
//! - **Friend request**: a directed edge `requester -> requested`, Pending or Accepted
//! - **Friend set**: derived on demand from Accepted edges, never stored
//! - **Privacy settings**: per-identity audiences evaluated by a pure policy
//! - **Relationship**: NotFriends / Friends / FriendsOfFriends
//!
//! ## Architecture
//!
//! - Pure business logic only (no I/O)
//! - Storage lives behind the [`traits::RelationshipStore`] and
//!   [`traits::IdentityStore`] traits, implemented in other crates
//! - The only external dependencies are `uuid` for identifiers and
//!   `async-trait` for the collaborator traits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod identity;
pub mod privacy;
pub mod relationship;
pub mod request;
pub mod traits;

// Re-exports for convenience
pub use identity::{Identity, IdentityId};
pub use privacy::{Audience, PrivacySettings};
pub use relationship::Relationship;
pub use request::{FriendRequest, RequestId, RequestRole, RequestStatus};
