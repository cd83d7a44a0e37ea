//! Identity provider boundary.
//!
//! The wallet only needs one thing from the identity provider: a best-effort
//! email address at account-creation time. Lookup failure never blocks the
//! credit or debit path; callers degrade to [`UNKNOWN_EMAIL`].

use async_trait::async_trait;
use thiserror::Error;
use wallet_shared::UserId;

/// Sentinel email recorded when the identity provider cannot resolve one.
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider could not be reached or returned an unexpected response.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Email lookup against the external identity provider.
#[async_trait]
pub trait EmailLookup: Send + Sync {
    /// Resolves the email for a user, `None` when the provider has no
    /// record for the id.
    async fn lookup_email(&self, user_id: &UserId) -> Result<Option<String>, IdentityError>;
}

/// Lookup that always comes back empty. Used when no identity provider is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmailLookup;

#[async_trait]
impl EmailLookup for NullEmailLookup {
    async fn lookup_email(&self, _user_id: &UserId) -> Result<Option<String>, IdentityError> {
        Ok(None)
    }
}
