//! Prompt construction
//!
//! The prompt requests exactly three labeled sections so the response
//! can be parsed mechanically. Retry prompts re-state the instructions
//! with the missing sections called out.

use sentinel_model::DiagnosticContext;

/// Section labels the model must emit, in the order we request them
pub const SECTION_LABELS: [&str; 3] = ["ROOT CAUSE", "FIXED SQL", "EXPLANATION"];

fn instructions() -> String {
    format!(
        "Respond with exactly three labeled sections, each starting on its own line:\n\
         {}: the specific condition that made the statement fail.\n\
         {}: the corrected statement, or the single word NONE if no fix is possible.\n\
         {}: why the change resolves the failure.",
        SECTION_LABELS[0], SECTION_LABELS[1], SECTION_LABELS[2]
    )
}

fn context_block(context: &DiagnosticContext) -> String {
    let ddls = if context.object_ddls.is_empty() {
        "Not available".to_string()
    } else {
        context.object_ddls.join("\n\n")
    };
    format!(
        "FAILED STATEMENT:\n{}\n\nERROR MESSAGE:\n{}\n\nREFERENCED OBJECT DDL:\n{}",
        context.statement_text, context.error_message, ddls
    )
}

/// Build the first-attempt prompt for a diagnostic context
#[must_use]
pub fn build_prompt(context: &DiagnosticContext) -> String {
    format!(
        "You are a senior database engineer performing root cause analysis \
         on a failed warehouse task.\n\n{}\n\n---\n\n{}",
        context_block(context),
        instructions()
    )
}

/// Build a retry prompt emphasizing the sections the last response lacked
#[must_use]
pub fn build_retry_prompt(context: &DiagnosticContext, missing: &[String]) -> String {
    format!(
        "{}\n\nYour previous response was missing the following required \
         section(s): {}. Repeat the full analysis and include every section.",
        build_prompt(context),
        missing.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> DiagnosticContext {
        DiagnosticContext {
            statement_text: "SELECT revenue / orders FROM sales".to_string(),
            error_message: "Division by zero".to_string(),
            object_ddls: vec!["CREATE TABLE sales (revenue NUMBER, orders NUMBER)".to_string()],
        }
    }

    #[test]
    fn prompt_embeds_context_and_all_labels() {
        let prompt = build_prompt(&context());
        assert!(prompt.contains("SELECT revenue / orders FROM sales"));
        assert!(prompt.contains("Division by zero"));
        assert!(prompt.contains("CREATE TABLE sales"));
        for label in SECTION_LABELS {
            assert!(prompt.contains(label), "missing label {label}");
        }
    }

    #[test]
    fn missing_ddl_is_stated_not_omitted() {
        let mut ctx = context();
        ctx.object_ddls.clear();
        assert!(build_prompt(&ctx).contains("Not available"));
    }

    #[test]
    fn retry_prompt_names_missing_sections() {
        let prompt = build_retry_prompt(&context(), &["FIXED SQL".to_string()]);
        assert!(prompt.contains("missing the following"));
        assert!(prompt.contains("FIXED SQL"));
    }
}
