//! Rule-based failure classification
//!
//! Category assignment pattern-matches the platform's error text and is
//! deliberately independent of anything the model says, so the cost
//! heuristic lookup stays deterministic run to run.

use once_cell::sync::Lazy;
use regex::Regex;
use sentinel_model::DiagnosisCategory;

static RULES: Lazy<Vec<(Regex, DiagnosisCategory)>> = Lazy::new(|| {
    let rule = |pattern: &str, category| {
        (
            Regex::new(&format!("(?i){pattern}")).expect("classifier pattern is valid"),
            category,
        )
    };
    vec![
        rule(r"division by zero|divide by zero", DiagnosisCategory::DivisionByZero),
        rule(
            r"does not exist|invalid identifier|unknown (table|column|object)|object .* not found",
            DiagnosisCategory::MissingObject,
        ),
        rule(
            r"syntax error|compilation error|unexpected '",
            DiagnosisCategory::SyntaxError,
        ),
        rule(
            r"insufficient privileges|not authorized|access denied|permission denied",
            DiagnosisCategory::PermissionDenied,
        ),
        rule(
            r"numeric value .* not recognized|can't parse|cannot be cast|out of range|invalid date",
            DiagnosisCategory::LogicError,
        ),
    ]
});

/// Classify an incident by its error text
///
/// First matching rule wins; anything unrecognized is `Other`.
#[must_use]
pub fn classify(error_message: &str) -> DiagnosisCategory {
    RULES
        .iter()
        .find(|(re, _)| re.is_match(error_message))
        .map_or(DiagnosisCategory::Other, |(_, category)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_error_classes() {
        assert_eq!(
            classify("Division by zero"),
            DiagnosisCategory::DivisionByZero
        );
        assert_eq!(
            classify("SQL compilation error: Object 'SALES' does not exist"),
            DiagnosisCategory::MissingObject
        );
        assert_eq!(
            classify("syntax error line 3 at position 14 unexpected 'FRUM'"),
            DiagnosisCategory::SyntaxError
        );
        assert_eq!(
            classify("Insufficient privileges to operate on table 'ORDERS'"),
            DiagnosisCategory::PermissionDenied
        );
        assert_eq!(
            classify("Numeric value 'abc' is not recognized"),
            DiagnosisCategory::LogicError
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            classify("DIVISION BY ZERO in expression"),
            DiagnosisCategory::DivisionByZero
        );
    }

    #[test]
    fn missing_object_beats_compilation_noise() {
        // Platform wraps missing objects in a "compilation error" banner;
        // the more specific rule must win.
        assert_eq!(
            classify("SQL compilation error: error line 1: 'REVENUE' does not exist"),
            DiagnosisCategory::MissingObject
        );
    }

    #[test]
    fn unknown_text_is_other() {
        assert_eq!(classify("something exploded"), DiagnosisCategory::Other);
    }
}
