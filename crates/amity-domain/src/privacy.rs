//! Privacy settings and the policy that evaluates them
//!
//! Settings are owned by the identity and read-only to the friendship engine.
//! Evaluation is pure: no I/O, no failure modes.

use crate::Relationship;

/// Who an identity admits for a given action
///
/// Ordered from fully open (`Everyone`) to fully closed (`Nobody`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Audience {
    /// Anyone
    #[default]
    Everyone,

    /// Friends and friends of friends
    FriendsOfFriends,

    /// Direct friends only
    Friends,

    /// No one
    Nobody,
}

impl Audience {
    /// Get the audience name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Everyone => "everyone",
            Audience::FriendsOfFriends => "friends_of_friends",
            Audience::Friends => "friends",
            Audience::Nobody => "nobody",
        }
    }

    /// Parse an audience from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "everyone" => Some(Audience::Everyone),
            "friends_of_friends" => Some(Audience::FriendsOfFriends),
            "friends" => Some(Audience::Friends),
            "nobody" => Some(Audience::Nobody),
            _ => None,
        }
    }

    /// Whether a viewer standing in `relationship` to the owner is admitted
    ///
    /// # Examples
    ///
    /// ```
    /// use amity_domain::{Audience, Relationship};
    ///
    /// assert!(Audience::FriendsOfFriends.admits(Relationship::Friends));
    /// assert!(!Audience::Friends.admits(Relationship::FriendsOfFriends));
    /// ```
    pub fn admits(&self, relationship: Relationship) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::FriendsOfFriends => relationship != Relationship::NotFriends,
            Audience::Friends => relationship == Relationship::Friends,
            Audience::Nobody => false,
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid audience: {}", s))
    }
}

/// Per-identity visibility preferences
///
/// Four independent dimensions, each an [`Audience`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivacySettings {
    /// Who may view the profile
    pub profile: Audience,

    /// Who may find the identity through search
    pub search: Audience,

    /// Who may open a chat
    pub chat_requests: Audience,

    /// Who may send a friend request
    pub friend_requests: Audience,
}

impl PrivacySettings {
    /// Settings with every dimension fully closed
    pub fn closed() -> Self {
        Self {
            profile: Audience::Nobody,
            search: Audience::Nobody,
            chat_requests: Audience::Nobody,
            friend_requests: Audience::Nobody,
        }
    }
}

/// Whether an identity with these settings may receive friend requests
///
/// True unless the friend-request dimension is fully closed.
pub fn can_receive_friend_request(settings: &PrivacySettings) -> bool {
    settings.friend_requests != Audience::Nobody
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_order() {
        assert!(Audience::Everyone < Audience::FriendsOfFriends);
        assert!(Audience::FriendsOfFriends < Audience::Friends);
        assert!(Audience::Friends < Audience::Nobody);
    }

    #[test]
    fn test_friend_requests_blocked_only_when_closed() {
        let mut settings = PrivacySettings::default();
        assert!(can_receive_friend_request(&settings));

        settings.friend_requests = Audience::Friends;
        assert!(can_receive_friend_request(&settings));

        settings.friend_requests = Audience::Nobody;
        assert!(!can_receive_friend_request(&settings));
    }

    #[test]
    fn test_other_dimensions_do_not_gate_requests() {
        let settings = PrivacySettings {
            friend_requests: Audience::Everyone,
            ..PrivacySettings::closed()
        };
        assert!(can_receive_friend_request(&settings));
    }

    #[test]
    fn test_admits() {
        use Relationship::*;

        assert!(Audience::Everyone.admits(NotFriends));
        assert!(Audience::FriendsOfFriends.admits(FriendsOfFriends));
        assert!(!Audience::FriendsOfFriends.admits(NotFriends));
        assert!(Audience::Friends.admits(Friends));
        assert!(!Audience::Nobody.admits(Friends));
    }

    #[test]
    fn test_audience_parse() {
        assert_eq!("Friends".parse::<Audience>(), Ok(Audience::Friends));
        assert_eq!(Audience::parse("friends_of_friends"), Some(Audience::FriendsOfFriends));
        assert!("strangers".parse::<Audience>().is_err());
    }
}
