//! Relationship classification between two identities
//!
//! Classification is a pure function of the two friend sets. Friends outranks
//! FriendsOfFriends: direct friends are never reported as friends of friends,
//! even when they also share a mutual friend.

use std::fmt;

use crate::IdentityId;

/// Graph distance between two identities, capped at two hops
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relationship {
    /// Neither adjacent nor sharing a mutual friend
    NotFriends,

    /// Share at least one mutual friend, not directly connected
    FriendsOfFriends,

    /// Connected by an Accepted request
    Friends,
}

impl Relationship {
    /// Get the relationship name
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::NotFriends => "not_friends",
            Relationship::FriendsOfFriends => "friends_of_friends",
            Relationship::Friends => "friends",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First mutual friend found scanning `a_friends` (outer) against `b_friends` (inner)
pub fn first_mutual(a_friends: &[IdentityId], b_friends: &[IdentityId]) -> Option<IdentityId> {
    for fa in a_friends {
        for fb in b_friends {
            if fa == fb {
                return Some(*fa);
            }
        }
    }
    None
}

/// Classify `b` relative to `a`, given both friend sets
///
/// # Examples
///
/// ```
/// use amity_domain::{IdentityId, Relationship};
/// use amity_domain::relationship::classify;
///
/// let (a, b, m) = (IdentityId::new(), IdentityId::new(), IdentityId::new());
/// assert_eq!(classify(&[m], b, &[m]), Relationship::FriendsOfFriends);
/// assert_eq!(classify(&[b], b, &[a]), Relationship::Friends);
/// ```
pub fn classify(a_friends: &[IdentityId], b: IdentityId, b_friends: &[IdentityId]) -> Relationship {
    if a_friends.contains(&b) {
        Relationship::Friends
    } else if first_mutual(a_friends, b_friends).is_some() {
        Relationship::FriendsOfFriends
    } else {
        Relationship::NotFriends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_sets_are_not_friends() {
        let (b, x, y) = (IdentityId::new(), IdentityId::new(), IdentityId::new());
        assert_eq!(classify(&[x], b, &[y]), Relationship::NotFriends);
        assert_eq!(classify(&[], b, &[]), Relationship::NotFriends);
    }

    #[test]
    fn test_friends_outranks_mutual() {
        let (a, b, m) = (IdentityId::new(), IdentityId::new(), IdentityId::new());
        assert_eq!(classify(&[b, m], b, &[a, m]), Relationship::Friends);
    }

    #[test]
    fn test_first_mutual_follows_outer_order() {
        let (m1, m2) = (IdentityId::new(), IdentityId::new());
        assert_eq!(first_mutual(&[m2, m1], &[m1, m2]), Some(m2));
        assert_eq!(first_mutual(&[m1, m2], &[m2, m1]), Some(m1));
    }

    #[test]
    fn test_strength_order() {
        assert!(Relationship::Friends > Relationship::FriendsOfFriends);
        assert!(Relationship::FriendsOfFriends > Relationship::NotFriends);
    }
}
