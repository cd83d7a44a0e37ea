//! HTTP client for the external identity provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use wallet_shared::UserId;

use wallet_core::identity::{EmailLookup, IdentityError};

/// Identity lookup over the provider's user API.
///
/// Failure here never blocks a wallet operation; the service degrades to
/// the sentinel email.
#[derive(Debug, Clone)]
pub struct HttpEmailLookup {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    email: Option<String>,
}

impl HttpEmailLookup {
    /// Creates a lookup client against the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl EmailLookup for HttpEmailLookup {
    async fn lookup_email(&self, user_id: &UserId) -> Result<Option<String>, IdentityError> {
        let url = format!(
            "{}/users/{}",
            self.base_url.trim_end_matches('/'),
            user_id.as_str()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(user_id = %user_id, "identity provider has no record");
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let record: UserRecord = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(record.email)
    }
}
