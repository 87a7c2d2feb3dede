//! Property tests: engine queries against a brute-force reading of random graphs

use std::collections::HashSet;
use std::sync::Arc;

use amity_domain::traits::RelationshipStore;
use amity_domain::{IdentityId, PrivacySettings, Relationship};
use amity_engine::{EngineConfig, FriendshipEngine};
use amity_store::MemoryStore;
use proptest::prelude::*;

const NODES: usize = 8;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Build a store from (requester, requested, accepted) triples over NODES identities
async fn build(edges: &[(usize, usize, bool)]) -> (Arc<MemoryStore>, Vec<IdentityId>, Vec<HashSet<usize>>) {
    let store = Arc::new(MemoryStore::new());
    let ids: Vec<IdentityId> = (0..NODES)
        .map(|i| store.register_identity(&format!("n{}", i), PrivacySettings::default()).unwrap().id)
        .collect();

    let mut adjacency = vec![HashSet::new(); NODES];
    for &(from, to, accepted) in edges {
        if from == to || store.create_request(ids[from], ids[to]).await.is_err() {
            continue;
        }
        if accepted {
            store.accept(ids[from], ids[to]).await.unwrap();
            adjacency[from].insert(to);
            adjacency[to].insert(from);
        }
    }
    (store, ids, adjacency)
}

fn edge_lists() -> impl Strategy<Value = Vec<(usize, usize, bool)>> {
    proptest::collection::vec((0..NODES, 0..NODES, any::<bool>()), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: friends of friends are exactly the two-hop nodes, minus self
    /// and direct friends, each reported once
    #[test]
    fn test_friends_of_friends_matches_brute_force(edges in edge_lists(), start in 0..NODES) {
        runtime().block_on(async {
            let (store, ids, adjacency) = build(&edges).await;
            let config = EngineConfig { fan_out_limit: 3, ..Default::default() };
            let engine = FriendshipEngine::new(store.clone(), store, config).unwrap();

            let result = engine.get_friends_of_friends(ids[start]).await.unwrap();

            let mut expected = HashSet::new();
            for &friend in &adjacency[start] {
                for &second in &adjacency[friend] {
                    if second != start && !adjacency[start].contains(&second) {
                        expected.insert(ids[second]);
                    }
                }
            }

            let unique: HashSet<IdentityId> = result.iter().copied().collect();
            prop_assert_eq!(unique.len(), result.len(), "duplicates in result");
            prop_assert_eq!(unique, expected);
            Ok(())
        })?;
    }

    /// Property: friendship and classification are symmetric
    #[test]
    fn test_relationship_is_symmetric(edges in edge_lists(), a in 0..NODES, b in 0..NODES) {
        prop_assume!(a != b);
        runtime().block_on(async {
            let (store, ids, adjacency) = build(&edges).await;
            let engine = FriendshipEngine::new(store.clone(), store, EngineConfig::default()).unwrap();

            let forward = engine.get_relationship(ids[a], ids[b]).await.unwrap();
            let backward = engine.get_relationship(ids[b], ids[a]).await.unwrap();
            prop_assert_eq!(forward, backward);

            let direct = adjacency[a].contains(&b);
            let shared = adjacency[a].intersection(&adjacency[b]).next().is_some();
            let expected = if direct {
                Relationship::Friends
            } else if shared {
                Relationship::FriendsOfFriends
            } else {
                Relationship::NotFriends
            };
            prop_assert_eq!(forward, expected);
            Ok(())
        })?;
    }
}
