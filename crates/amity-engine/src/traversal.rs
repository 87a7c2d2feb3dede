//! Friends-of-friends fan-out
//!
//! One friend-set read per direct friend, run concurrently under a semaphore
//! and joined before the union. The union walks results in direct-friend
//! order, so the output does not depend on which read finishes first.

use std::collections::HashSet;
use std::sync::Arc;

use amity_domain::traits::RelationshipStore;
use amity_domain::IdentityId;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::FriendshipError;

const OPERATION: &str = "get_friends_of_friends";

/// Identities two hops from `id`, excluding `id` and its direct `friends`
///
/// Any failed read aborts the remaining reads and is returned as is. Dropping
/// the returned future aborts every read still in flight.
pub(crate) async fn friends_of_friends<R>(
    store: Arc<R>,
    id: IdentityId,
    friends: &[IdentityId],
    fan_out_limit: usize,
) -> Result<Vec<IdentityId>, FriendshipError>
where
    R: RelationshipStore + 'static,
{
    if friends.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(fan_out_limit.max(1)));
    let mut reads = JoinSet::new();

    for (index, friend) in friends.iter().copied().enumerate() {
        let store = Arc::clone(&store);
        let semaphore = Arc::clone(&semaphore);

        reads.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| FriendshipError::Cancelled { operation: OPERATION })?;

            let second_hop = store
                .friends_of(friend)
                .await
                .map_err(|e| FriendshipError::from_store(OPERATION, e))?;

            Ok::<_, FriendshipError>((index, second_hop))
        });
    }

    let mut second_hops: Vec<Vec<IdentityId>> = vec![Vec::new(); friends.len()];
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok(Ok((index, second_hop))) => second_hops[index] = second_hop,
            Ok(Err(e)) => {
                reads.abort_all();
                tracing::warn!(identity = %id, error = %e, "Friends-of-friends traversal aborted");
                return Err(e);
            }
            Err(join_error) => {
                reads.abort_all();
                tracing::warn!(identity = %id, error = %join_error, "Friend-set read did not complete");
                return Err(FriendshipError::StoreUnavailable {
                    operation: OPERATION,
                    source: Box::new(join_error),
                });
            }
        }
    }

    Ok(union_excluding(id, friends, second_hops))
}

/// Merge second-hop sets, dropping `id`, its direct friends and repeats
fn union_excluding(
    id: IdentityId,
    friends: &[IdentityId],
    second_hops: Vec<Vec<IdentityId>>,
) -> Vec<IdentityId> {
    let mut seen: HashSet<IdentityId> = friends.iter().copied().collect();
    seen.insert(id);

    second_hops
        .into_iter()
        .flatten()
        .filter(|candidate| seen.insert(*candidate))
        .collect()
}
