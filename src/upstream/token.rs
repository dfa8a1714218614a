//! Bearer token acquisition (OAuth password grant).
//!
//! Tokens are not cached: every fetch authenticates again.

use serde::Deserialize;
use std::sync::Arc;

use crate::config::Credentials;
use crate::resilience::{RetryingTransport, TransportError};
use crate::upstream::error::AuthError;

/// A short-lived access token. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Issues password-grant requests against the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    transport: Arc<RetryingTransport>,
    token_url: String,
}

impl TokenProvider {
    pub fn new(transport: Arc<RetryingTransport>, token_url: impl Into<String>) -> Self {
        Self {
            transport,
            token_url: token_url.into(),
        }
    }

    /// Request a fresh token.
    pub async fn acquire_token(&self, credentials: &Credentials) -> Result<BearerToken, AuthError> {
        let request = self
            .transport
            .client()
            .post(&self.token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .build()
            .map_err(|e| AuthError::RequestFailed(TransportError::Build(e)))?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(AuthError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected { status: status.as_u16() });
        }

        // A body that is not JSON has no token either.
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read token response");
            AuthError::MissingToken
        })?;
        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|_| AuthError::MissingToken)?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!("Acquired bearer token");
                Ok(BearerToken(token))
            }
            _ => Err(AuthError::MissingToken),
        }
    }
}
