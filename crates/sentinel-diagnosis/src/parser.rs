//! Response section extraction
//!
//! The model's output is untrusted free text. Extraction is a validating
//! decode: each of the three labels must be present, in any order, any
//! casing, with incidental whitespace tolerated. Anything less is
//! malformed and reported with the missing labels, never papered over.

use crate::error::MalformedResponse;
use crate::prompt::SECTION_LABELS;
use once_cell::sync::Lazy;
use regex::Regex;

/// The three extracted sections of a well-formed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSections {
    /// ROOT CAUSE section body
    pub root_cause: String,
    /// FIXED SQL section body; `None` when the model answered NONE
    pub fixed_statement: Option<String>,
    /// EXPLANATION section body
    pub explanation: String,
}

// Label at line start, case-insensitive, optional markdown/number noise
// before it, colon after.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t#*\d.)-]*?(ROOT\s+CAUSE|FIXED\s+SQL|EXPLANATION)\s*:\**")
        .expect("label regex is valid")
});

static SQL_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```(?:sql)?\s*(.*?)```").expect("fence regex is valid")
});

fn canonical_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Strip a markdown code fence from a FIXED SQL body, if one is present
fn unwrap_sql(body: &str) -> Option<String> {
    let inner = SQL_FENCE_RE
        .captures(body)
        .map_or_else(|| body.trim().to_string(), |c| c[1].trim().to_string());
    if inner.is_empty() || inner.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(inner)
    }
}

/// Extract the three required sections from a raw model response
///
/// # Errors
///
/// Returns [`MalformedResponse`] naming every missing label when the
/// response does not contain all three sections.
pub fn parse_response(raw: &str) -> Result<ParsedSections, MalformedResponse> {
    // Locate every label occurrence, then slice the text between them.
    let mut found: Vec<(String, usize, usize)> = LABEL_RE
        .captures_iter(raw)
        .filter_map(|c| {
            let m = c.get(1)?;
            let whole = c.get(0)?;
            Some((canonical_label(m.as_str()), whole.start(), whole.end()))
        })
        .collect();
    found.sort_by_key(|&(_, start, _)| start);

    let mut sections: Vec<(String, String)> = Vec::with_capacity(found.len());
    for (i, (label, _, body_start)) in found.iter().enumerate() {
        let body_end = found.get(i + 1).map_or(raw.len(), |&(_, start, _)| start);
        let body = raw[*body_start..body_end].trim().to_string();
        // First occurrence of a label wins.
        if !sections.iter().any(|(l, _)| l == label) {
            sections.push((label.clone(), body));
        }
    }

    let get = |label: &str| -> Option<&String> {
        sections.iter().find(|(l, _)| l == label).map(|(_, b)| b)
    };

    let missing: Vec<String> = SECTION_LABELS
        .iter()
        .filter(|label| get(label).map_or(true, |body| body.is_empty()))
        .map(|label| (*label).to_string())
        .collect();

    if !missing.is_empty() {
        return Err(MalformedResponse { missing });
    }

    Ok(ParsedSections {
        root_cause: get("ROOT CAUSE").cloned().unwrap_or_default(),
        fixed_statement: unwrap_sql(get("FIXED SQL").map(String::as_str).unwrap_or_default()),
        explanation: get("EXPLANATION").cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WELL_FORMED: &str = "\
ROOT CAUSE: The orders column can be zero.

FIXED SQL:
```sql
SELECT CASE WHEN orders = 0 THEN 0 ELSE revenue / orders END FROM sales
```

EXPLANATION: Guarding the denominator avoids the division fault.";

    #[test]
    fn extracts_all_three_sections() {
        let parsed = parse_response(WELL_FORMED).unwrap();
        assert_eq!(parsed.root_cause, "The orders column can be zero.");
        assert_eq!(
            parsed.fixed_statement.as_deref(),
            Some("SELECT CASE WHEN orders = 0 THEN 0 ELSE revenue / orders END FROM sales")
        );
        assert!(parsed.explanation.starts_with("Guarding"));
    }

    #[test]
    fn section_order_does_not_matter() {
        let reordered = "\
EXPLANATION: guard it.
FIXED SQL: SELECT 1
ROOT CAUSE: zero denominator";
        let parsed = parse_response(reordered).unwrap();
        assert_eq!(parsed.root_cause, "zero denominator");
        assert_eq!(parsed.fixed_statement.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn casing_and_whitespace_are_tolerated() {
        let sloppy = "\
  root cause :  bad join
**Fixed SQL:** SELECT 2
   ExPlAnAtIoN:   fixed the join";
        let parsed = parse_response(sloppy).unwrap();
        assert_eq!(parsed.root_cause, "bad join");
        assert_eq!(parsed.fixed_statement.as_deref(), Some("SELECT 2"));
        assert_eq!(parsed.explanation, "fixed the join");
    }

    #[test]
    fn missing_label_reports_which() {
        let partial = "ROOT CAUSE: something\nEXPLANATION: because";
        let err = parse_response(partial).unwrap_err();
        assert_eq!(err.missing, vec!["FIXED SQL".to_string()]);
    }

    #[test]
    fn empty_section_body_counts_as_missing() {
        let hollow = "ROOT CAUSE:\nFIXED SQL: SELECT 1\nEXPLANATION: ok";
        let err = parse_response(hollow).unwrap_err();
        assert_eq!(err.missing, vec!["ROOT CAUSE".to_string()]);
    }

    #[test]
    fn none_fix_maps_to_absent() {
        let resp = "ROOT CAUSE: table gone\nFIXED SQL: NONE\nEXPLANATION: recreate it";
        let parsed = parse_response(resp).unwrap();
        assert_eq!(parsed.fixed_statement, None);
    }

    #[test]
    fn garbage_reports_everything_missing() {
        let err = parse_response("I could not analyze this.").unwrap_err();
        assert_eq!(err.missing.len(), 3);
    }
}
