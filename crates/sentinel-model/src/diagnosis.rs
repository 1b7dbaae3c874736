//! Structured diagnoses
//!
//! The language model's free-text response is parsed elsewhere into this
//! structure; a `Diagnosis` that reaches the rest of the pipeline is
//! either complete, or explicitly marked incomplete with the raw
//! response retained for audit.

use serde::{Deserialize, Serialize};

/// Diagnostic bundle assembled for one incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticContext {
    /// Text of the failing statement
    pub statement_text: String,
    /// Error message from the failing run
    pub error_message: String,
    /// DDL of objects referenced by the statement, where resolvable
    pub object_ddls: Vec<String>,
}

/// Coarse failure classification, rule-derived from the error text
///
/// Assignment is independent of the model's wording so the cost
/// heuristic lookup stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosisCategory {
    /// Arithmetic fault in the statement (division by zero and kin)
    DivisionByZero,
    /// Referenced table/column/object does not exist
    MissingObject,
    /// Statement fails to compile
    SyntaxError,
    /// Insufficient privileges
    PermissionDenied,
    /// Statement runs but computes the wrong thing
    LogicError,
    /// Anything unrecognized
    Other,
}

impl DiagnosisCategory {
    /// Whether this category implies a corrected statement should exist
    #[inline]
    #[must_use]
    pub fn requires_fix(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Whether a diagnosis parsed fully or was abandoned after retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Completeness {
    /// All required sections were extracted
    Complete,
    /// Retries exhausted or a required fix is missing
    Incomplete,
}

/// Structured root-cause diagnosis for one incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Root-cause explanation
    pub root_cause: String,
    /// Corrected statement, absent when the model could not produce one
    pub fixed_statement: Option<String>,
    /// Why the proposed change resolves the failure
    pub rationale: String,
    /// Rule-based failure classification
    pub category: DiagnosisCategory,
    /// Complete or incomplete
    pub completeness: Completeness,
    /// Model attempts consumed (1 = first response parsed cleanly)
    pub attempts_used: u32,
    /// Raw model response, retained when the diagnosis is incomplete
    pub raw_response: Option<String>,
}

impl Diagnosis {
    /// Whether this diagnosis can be acted upon
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completeness == Completeness::Complete
    }

    /// Enforce the fix invariant: a category that requires a fix with no
    /// corrected statement downgrades the diagnosis to incomplete.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if self.category.requires_fix()
            && self.fixed_statement.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            self.completeness = Completeness::Incomplete;
        }
        self
    }

    /// One-line summary for notifications and run reports
    #[must_use]
    pub fn summary(&self) -> String {
        let first_line = self.root_cause.lines().next().unwrap_or("").trim();
        match self.completeness {
            Completeness::Complete => first_line.to_string(),
            Completeness::Incomplete => format!("[incomplete] {first_line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(category: DiagnosisCategory, fix: Option<&str>) -> Diagnosis {
        Diagnosis {
            root_cause: "Divides by a column that can be zero".to_string(),
            fixed_statement: fix.map(str::to_string),
            rationale: "Guard the denominator".to_string(),
            category,
            completeness: Completeness::Complete,
            attempts_used: 1,
            raw_response: None,
        }
    }

    #[test]
    fn missing_fix_downgrades_to_incomplete() {
        let d = diagnosis(DiagnosisCategory::DivisionByZero, None).validated();
        assert_eq!(d.completeness, Completeness::Incomplete);

        let d = diagnosis(DiagnosisCategory::DivisionByZero, Some("  ")).validated();
        assert_eq!(d.completeness, Completeness::Incomplete);
    }

    #[test]
    fn fix_preserves_completeness() {
        let d = diagnosis(DiagnosisCategory::DivisionByZero, Some("SELECT 1")).validated();
        assert_eq!(d.completeness, Completeness::Complete);
    }

    #[test]
    fn other_category_needs_no_fix() {
        let d = diagnosis(DiagnosisCategory::Other, None).validated();
        assert_eq!(d.completeness, Completeness::Complete);
    }

    #[test]
    fn summary_flags_incomplete() {
        let mut d = diagnosis(DiagnosisCategory::Other, None);
        d.completeness = Completeness::Incomplete;
        assert!(d.summary().starts_with("[incomplete]"));
    }
}
