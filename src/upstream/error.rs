//! Upstream error taxonomy.

use thiserror::Error;

use crate::resilience::TransportError;

/// Which request of a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Token,
    Data,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Token => f.write_str("token"),
            FetchStage::Data => f.write_str("data"),
        }
    }
}

/// Errors acquiring a bearer token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    RequestFailed(#[source] TransportError),

    #[error("token endpoint rejected credentials with HTTP {status}")]
    Rejected { status: u16 },

    #[error("token response has no access_token")]
    MissingToken,
}

/// Errors fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Retries ran out on the token or data request.
    #[error("{stage} request exhausted after {attempts} attempts (last status: {last_status:?})")]
    TransportExhausted {
        stage: FetchStage,
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("authentication failed: {0}")]
    Auth(#[source] AuthError),

    /// Non-retryable error status from the data endpoint.
    #[error("data endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("bad payload: {0}")]
    BadPayload(String),

    #[error("{stage} request error: {source}")]
    Request {
        stage: FetchStage,
        #[source]
        source: TransportError,
    },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Lift a transport failure into the fetch taxonomy.
    pub fn transport(stage: FetchStage, err: TransportError) -> Self {
        match err {
            TransportError::Exhausted { attempts, last_status, .. } => FetchError::TransportExhausted {
                stage,
                attempts,
                last_status,
            },
            other => FetchError::Request { stage, source: other },
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::TransportExhausted { .. } => "exhausted",
            FetchError::Auth(_) => "auth",
            FetchError::Status { .. } => "status",
            FetchError::BadPayload(_) => "bad_payload",
            FetchError::Request { .. } => "request",
            FetchError::Body(_) => "body",
        }
    }
}

impl From<AuthError> for FetchError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::RequestFailed(transport) => FetchError::transport(FetchStage::Token, transport),
            other => FetchError::Auth(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_exhaustion_becomes_transport_exhausted() {
        let err: FetchError = AuthError::RequestFailed(TransportError::Exhausted {
            attempts: 5,
            last_status: Some(503),
            last_error: None,
        })
        .into();
        assert!(matches!(
            err,
            FetchError::TransportExhausted { stage: FetchStage::Token, attempts: 5, last_status: Some(503) }
        ));
        assert_eq!(err.kind(), "exhausted");
    }

    #[test]
    fn test_missing_token_stays_auth() {
        let err: FetchError = AuthError::MissingToken.into();
        assert!(matches!(err, FetchError::Auth(AuthError::MissingToken)));
        assert_eq!(err.to_string(), "authentication failed: token response has no access_token");
    }
}
