//! Identifier types
//!
//! ULID-backed ids for runs and investigations (sortable, like event
//! timestamps), plus the content-derived incident fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

/// Unique pipeline-run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique investigation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvestigationId(pub Ulid);

impl InvestigationId {
    /// Generate new investigation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for InvestigationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvestigationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable incident identity key
///
/// Derived from the normalized task name (trimmed, uppercased) so the same
/// task correlates across runs regardless of how the source spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a task name
    #[must_use]
    pub fn of_task(task_name: &str) -> Self {
        let normalized = task_name.trim().to_uppercase();
        let digest = Sha256::digest(normalized.as_bytes());
        Self(hex::encode(digest))
    }

    /// Hex digest as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for logs and notification references
    ///
    /// Deserialized fingerprints are not guaranteed to be full digests;
    /// anything shorter is returned whole.
    #[inline]
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_case_and_whitespace_insensitive() {
        let a = Fingerprint::of_task("task_broken_division");
        let b = Fingerprint::of_task("  TASK_BROKEN_DIVISION ");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_distinguishes_tasks() {
        let a = Fingerprint::of_task("task_a");
        let b = Fingerprint::of_task("task_b");
        assert_ne!(a, b);
    }

    #[test]
    fn short_form_is_twelve_chars() {
        let fp = Fingerprint::of_task("task_a");
        assert_eq!(fp.short().len(), 12);
    }

    #[test]
    fn short_form_tolerates_truncated_snapshots() {
        let fp: Fingerprint = serde_json::from_str(r#""abc123""#).unwrap();
        assert_eq!(fp.short(), "abc123");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(InvestigationId::new(), InvestigationId::new());
        assert_ne!(RunId::new(), RunId::new());
    }
}
