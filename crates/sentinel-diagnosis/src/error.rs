//! Error types for the diagnosis engine

/// Failure talking to the language-model collaborator
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Transient transport failure (timeout, connection, rate-limit reply)
    #[error("transient model failure: {0}")]
    Transient(String),

    /// Non-retryable failure (bad request, auth, provider rejection)
    #[error("model request rejected: {0}")]
    Terminal(String),
}

impl ModelError {
    /// Whether a retry could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Diagnosis engine failure surfaced to the orchestrator
///
/// A malformed model response is never an error here: the engine retries
/// and then returns an incomplete diagnosis. Only transport-level
/// failures escape.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    /// The collaborator could not be reached at all
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
}

/// A response missing one or more required section labels
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed model response, missing sections: {}", missing.join(", "))]
pub struct MalformedResponse {
    /// Labels that could not be found
    pub missing: Vec<String>,
}
