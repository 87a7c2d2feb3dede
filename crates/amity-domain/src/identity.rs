//! Identity references
//!
//! The identity entity itself (profile fields, account data) belongs to the
//! identity store. The friendship engine only ever holds references to it.

use std::fmt;

use crate::PrivacySettings;

/// Opaque reference to an identity, backed by a UUIDv7
///
/// Equality is the only operation the friendship engine relies on. Ordering
/// and hashing are provided so ids can live in sets and maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityId(u128);

impl IdentityId {
    /// Generate a new UUIDv7-based IdentityId
    ///
    /// # Examples
    ///
    /// ```
    /// use amity_domain::IdentityId;
    ///
    /// let a = IdentityId::new();
    /// let b = IdentityId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an IdentityId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an IdentityId from its hyphenated UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use amity_domain::IdentityId;
    ///
    /// let id = IdentityId::new();
    /// let parsed = IdentityId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid identity id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// An identity as known to the identity store
///
/// Only the fields the friendship engine needs are modelled here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Identifier
    pub id: IdentityId,

    /// Contact handle used to address friend requests (e.g. an email address)
    pub handle: String,

    /// Visibility preferences
    pub privacy: PrivacySettings,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: equality and ordering follow the underlying value
        #[test]
        fn test_identity_ordering_property(a: u128, b: u128) {
            let id_a = IdentityId::from_value(a);
            let id_b = IdentityId::from_value(b);

            prop_assert_eq!(id_a == id_b, a == b);
            prop_assert_eq!(id_a < id_b, a < b);
        }

        /// Property: the string form parses back to the same id
        #[test]
        fn test_identity_string_roundtrip(value: u128) {
            let id = IdentityId::from_value(value);

            match IdentityId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
