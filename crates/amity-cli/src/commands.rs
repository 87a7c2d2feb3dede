//! Command implementations.

use std::sync::Arc;

use amity_domain::traits::IdentityStore;
use amity_domain::{FriendRequest, IdentityId, PrivacySettings};
use amity_engine::{FriendshipEngine, SendOutcome};
use amity_store::SqliteStore;
use anyhow::{anyhow, Result};

use crate::cli::Command;

type Engine = FriendshipEngine<SqliteStore, SqliteStore>;

/// Execute one command against the store.
pub async fn execute(command: Command, store: Arc<SqliteStore>, engine: &Engine) -> Result<()> {
    match command {
        Command::Register {
            handle,
            friend_requests,
        } => {
            let privacy = PrivacySettings {
                friend_requests,
                ..Default::default()
            };
            let identity = store.register_identity(&handle, privacy).await?;
            println!("Registered {} as {}", identity.handle, identity.id);
        }

        Command::Privacy {
            handle,
            friend_requests,
        } => {
            let id = resolve(&store, &handle).await?;
            let mut privacy = store.privacy_settings(id).await?;
            privacy.friend_requests = friend_requests;
            store.update_privacy(id, privacy).await?;
            println!("{} now accepts friend requests from: {}", handle, friend_requests.as_str());
        }

        Command::Send { from, to } => {
            let requester = resolve(&store, &from).await?;
            match engine.send_request(requester, &to).await? {
                SendOutcome::Sent(request) => println!("Request {} sent to {}", request.id, to),
                SendOutcome::NoSuchIdentity => println!("No identity with handle {}", to),
            }
        }

        Command::Accept {
            requester,
            requested,
        } => {
            let request = engine
                .accept_request(resolve(&store, &requester).await?, resolve(&store, &requested).await?)
                .await?;
            println!("{} and {} are now friends (request {})", requester, requested, request.id);
        }

        Command::Deny {
            requester,
            requested,
        } => {
            engine
                .deny_request(resolve(&store, &requester).await?, resolve(&store, &requested).await?)
                .await?;
            println!("Request from {} to {} denied", requester, requested);
        }

        Command::Requests { handle } => {
            let id = resolve(&store, &handle).await?;
            let sent = engine.get_sent_requests(id).await?;
            let received = engine.get_received_requests(id).await?;

            println!("Sent ({}):", sent.len());
            for request in &sent {
                println!("  -> {}", describe(&store, request.requested, request).await?);
            }
            println!("Received ({}):", received.len());
            for request in &received {
                println!("  <- {}", describe(&store, request.requester, request).await?);
            }
        }

        Command::Friends { handle } => {
            let id = resolve(&store, &handle).await?;
            print_identities(&store, &engine.get_friends(id).await?).await?;
        }

        Command::Fof { handle } => {
            let id = resolve(&store, &handle).await?;
            let result = engine
                .get_friends_of_friends_until(id, async {
                    // Ctrl+C abandons the traversal; a failed handler install never fires
                    if tokio::signal::ctrl_c().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
            print_identities(&store, &result).await?;
        }

        Command::Relationship { a, b } => {
            let relationship = engine
                .get_relationship(resolve(&store, &a).await?, resolve(&store, &b).await?)
                .await?;
            println!("{}", relationship);
        }

        Command::Mutual { a, b } => {
            let mutual = engine
                .get_mutual_friends(resolve(&store, &a).await?, resolve(&store, &b).await?)
                .await?;
            print_identities(&store, &mutual).await?;
        }
    }

    Ok(())
}

async fn resolve(store: &SqliteStore, handle: &str) -> Result<IdentityId> {
    store
        .resolve_by_handle(handle)
        .await?
        .ok_or_else(|| anyhow!("no identity with handle '{}'", handle))
}

async fn handle_of(store: &SqliteStore, id: IdentityId) -> Result<String> {
    Ok(store
        .get_identity(id)
        .await?
        .map(|identity| identity.handle)
        .unwrap_or_else(|| id.to_string()))
}

async fn describe(store: &SqliteStore, other: IdentityId, request: &FriendRequest) -> Result<String> {
    Ok(format!(
        "{} ({}, sent at {})",
        handle_of(store, other).await?,
        request.status,
        request.date_sent
    ))
}

async fn print_identities(store: &SqliteStore, ids: &[IdentityId]) -> Result<()> {
    if ids.is_empty() {
        println!("(none)");
    }
    for id in ids {
        println!("{}", handle_of(store, *id).await?);
    }
    Ok(())
}
