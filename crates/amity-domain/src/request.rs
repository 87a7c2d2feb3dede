//! Friend request edges
//!
//! A request is a directed record from the requester to the requested identity.
//! It is created Pending, may be Accepted exactly once by the requested party,
//! or is deleted when denied. There is no persisted Denied state.

use std::fmt;

use crate::IdentityId;

/// Unique identifier for a friend request (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RequestId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Status of an existing friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    /// Awaiting a decision by the requested identity
    Pending,

    /// Confirmed friendship (direction no longer matters)
    Accepted,
}

impl RequestStatus {
    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
        }
    }

    /// Parse a status from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a request an identity is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestRole {
    /// The identity that sent the request
    Requester,

    /// The identity the request was sent to
    Requested,
}

/// A directed friend request between two identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequest {
    /// Identifier
    pub id: RequestId,

    /// Identity that sent the request
    pub requester: IdentityId,

    /// Identity that received the request
    pub requested: IdentityId,

    /// Current status
    pub status: RequestStatus,

    /// When the request was sent (milliseconds since Unix epoch)
    pub date_sent: u64,

    /// When the request was accepted; only set once Accepted
    pub date_accepted: Option<u64>,
}

impl FriendRequest {
    /// Create a new Pending request
    ///
    /// Returns `None` when `requester == requested`.
    pub fn pending(requester: IdentityId, requested: IdentityId, date_sent: u64) -> Option<Self> {
        if requester == requested {
            return None;
        }

        Some(Self {
            id: RequestId::new(),
            requester,
            requested,
            status: RequestStatus::Pending,
            date_sent,
            date_accepted: None,
        })
    }

    /// Whether this request relates `a` and `b`, in either direction
    pub fn connects(&self, a: IdentityId, b: IdentityId) -> bool {
        (self.requester == a && self.requested == b) || (self.requester == b && self.requested == a)
    }

    /// The identity on the other side of the edge from `id`
    ///
    /// Returns `None` when `id` is not part of this request.
    pub fn counterpart(&self, id: IdentityId) -> Option<IdentityId> {
        if self.requester == id {
            Some(self.requested)
        } else if self.requested == id {
            Some(self.requester)
        } else {
            None
        }
    }

    /// The identity occupying `role`
    pub fn party(&self, role: RequestRole) -> IdentityId {
        match role {
            RequestRole::Requester => self.requester,
            RequestRole::Requested => self.requested,
        }
    }

    /// Transition to Accepted, stamping the acceptance time
    ///
    /// Returns `false` (and leaves the request untouched) unless it is Pending.
    pub fn accept(&mut self, now: u64) -> bool {
        if self.status != RequestStatus::Pending {
            return false;
        }
        self.status = RequestStatus::Accepted;
        self.date_accepted = Some(now);
        true
    }
}
