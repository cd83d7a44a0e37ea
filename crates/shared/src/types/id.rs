//! Typed user identifier.
//!
//! User ids come from the external identity provider and are opaque strings,
//! not UUIDs. Wrapping them in a newtype keeps empty ids out of the system
//! at the edge instead of deep inside a store call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a user id fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("user id must be a non-empty string")]
pub struct InvalidUserId;

/// Opaque identifier for a wallet user, assigned by the identity provider.
///
/// Guaranteed non-empty (after trimming) by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a user id, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidUserId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidUserId);
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_user_id() {
        let id = UserId::new("firebase-uid-123").unwrap();
        assert_eq!(id.as_str(), "firebase-uid-123");
        assert_eq!(id.to_string(), "firebase-uid-123");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_rejects_blank_ids(#[case] raw: &str) {
        assert_eq!(UserId::new(raw), Err(InvalidUserId));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<UserId, _> = serde_json::from_str("\"u1\"");
        assert!(ok.is_ok());

        let blank: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }
}
