//! Amity Friendship Engine
//!
//! Request state machine and relationship queries over the collaborator
//! traits defined in `amity-domain`.
//!
//! # Overview
//!
//! - **Requests**: send (gated by the requested identity's privacy settings),
//!   accept, deny. Denied requests are deleted.
//! - **Friend sets**: derived from Accepted requests on every call.
//! - **Friends of friends**: one friend-set read per direct friend, issued
//!   concurrently up to [`EngineConfig::fan_out_limit`] and joined before the
//!   union. A single failed read fails the whole call.
//! - **Classification**: [`Relationship`](amity_domain::Relationship) between
//!   two identities.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use amity_domain::PrivacySettings;
//! use amity_engine::{EngineConfig, FriendshipEngine, SendOutcome};
//! use amity_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::new("amity.db")?);
//!     let alice = store.register_identity("alice@example.com", PrivacySettings::default()).await?;
//!     let bob = store.register_identity("bob@example.com", PrivacySettings::default()).await?;
//!
//!     let engine = FriendshipEngine::new(store.clone(), store, EngineConfig::default())?;
//!     if let SendOutcome::Sent(_) = engine.send_request(alice.id, "bob@example.com").await? {
//!         engine.accept_request(alice.id, bob.id).await?;
//!     }
//!     assert!(engine.is_friend(alice.id, bob.id).await?);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! fan_out_limit = 8
//! validate_identities = true
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod traversal;

pub use config::{ConfigError, EngineConfig};
pub use engine::{FriendshipEngine, SendOutcome};
pub use error::{BoxError, ConflictKind, FriendshipError};
