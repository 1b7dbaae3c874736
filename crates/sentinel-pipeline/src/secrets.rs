//! Secret resolution
//!
//! The pipeline needs credentials for its collaborators but must not
//! know where they live. `SecretResolver` is the single capability
//! interface; backends are pluggable and chainable.

use std::collections::HashMap;

/// Secret lookup failure
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecretError {
    /// No backend could produce the named secret
    #[error("secret not found: {0}")]
    NotFound(String),
}

/// Capability interface for credential lookup
pub trait SecretResolver: Send + Sync {
    /// Resolve a named secret to its value
    ///
    /// # Errors
    ///
    /// Fails with [`SecretError::NotFound`] when the name is unknown.
    fn resolve(&self, name: &str) -> Result<String, SecretError>;
}

/// Resolves secrets from process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretResolver for EnvSecrets {
    fn resolve(&self, name: &str) -> Result<String, SecretError> {
        std::env::var(name).map_err(|_| SecretError::NotFound(name.to_string()))
    }
}

/// Fixed in-memory secrets, for tests and embedded deployments
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one named secret
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretResolver for StaticSecrets {
    fn resolve(&self, name: &str) -> Result<String, SecretError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}

/// Tries each backend in order, first hit wins
#[derive(Default)]
pub struct ChainResolver {
    backends: Vec<Box<dyn SecretResolver>>,
}

impl ChainResolver {
    /// Empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend to the chain
    #[must_use]
    pub fn with_backend(mut self, backend: impl SecretResolver + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }
}

impl SecretResolver for ChainResolver {
    fn resolve(&self, name: &str) -> Result<String, SecretError> {
        self.backends
            .iter()
            .find_map(|b| b.resolve(name).ok())
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }
}
