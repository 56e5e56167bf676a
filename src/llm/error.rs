use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend timed out after {0}s")]
    Timeout(u64),

    #[error("network error talking to generation backend: {0}")]
    Network(String),

    #[error("generation backend rejected credentials: {0}")]
    Auth(String),

    #[error("generation backend quota exceeded: {0}")]
    Quota(String),

    #[error("generation backend returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected response from generation backend: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Failures worth one more attempt: timeouts, connection trouble and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout(_) | GenerationError::Network(_) => true,
            GenerationError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GenerationError::Auth(body),
            429 => GenerationError::Quota(body),
            _ => GenerationError::Upstream { status, body },
        }
    }
}
