//! Diagnosis engine
//!
//! Sends the diagnostic bundle to the language-model collaborator and
//! decodes the response. Malformed responses are retried a bounded
//! number of times with the missing sections called out; after that the
//! diagnosis is returned marked incomplete with the raw response kept
//! for audit. A parse failure is never surfaced as a valid diagnosis.

use crate::classify::classify;
use crate::error::{DiagnosisError, ModelError};
use crate::parser::parse_response;
use crate::prompt::{build_prompt, build_retry_prompt};
use async_trait::async_trait;
use sentinel_model::{Completeness, Diagnosis, DiagnosticContext};
use std::sync::Arc;

/// Language-model collaborator
///
/// Transport, authentication and rate limiting live behind this trait;
/// the engine only sees prompt in, raw text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one prompt, return the raw text response
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Engine configuration
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Extra attempts after a malformed first response
    pub max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

/// Turns diagnostic context into structured diagnoses
pub struct DiagnosisEngine {
    client: Arc<dyn ModelClient>,
    config: EngineConfig,
}

impl DiagnosisEngine {
    /// Create an engine over a model client
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>, config: EngineConfig) -> Self {
        Self { client, config }
    }

    /// Diagnose one incident's context
    ///
    /// Consumes one model call per attempt. The returned diagnosis is
    /// complete when a response parsed cleanly, incomplete otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosisError::Model`] when the collaborator itself is
    /// unreachable; malformed output is not an error.
    pub async fn diagnose(
        &self,
        context: &DiagnosticContext,
    ) -> Result<Diagnosis, DiagnosisError> {
        let category = classify(&context.error_message);
        let mut prompt = build_prompt(context);
        let mut last_raw = String::new();

        for attempt in 1..=self.config.max_retries + 1 {
            let raw = self.client.complete(&prompt).await?;
            match parse_response(&raw) {
                Ok(sections) => {
                    tracing::debug!(attempt, ?category, "diagnosis parsed");
                    return Ok(Diagnosis {
                        root_cause: sections.root_cause,
                        fixed_statement: sections.fixed_statement,
                        rationale: sections.explanation,
                        category,
                        completeness: Completeness::Complete,
                        attempts_used: attempt,
                        raw_response: None,
                    }
                    .validated());
                }
                Err(malformed) => {
                    tracing::warn!(attempt, %malformed, "malformed model response");
                    prompt = build_retry_prompt(context, &malformed.missing);
                    last_raw = raw;
                }
            }
        }

        tracing::warn!(
            attempts = self.config.max_retries + 1,
            "diagnosis retries exhausted, marking incomplete"
        );
        Ok(Diagnosis {
            root_cause: String::new(),
            fixed_statement: None,
            rationale: String::new(),
            category,
            completeness: Completeness::Incomplete,
            attempts_used: self.config.max_retries + 1,
            raw_response: Some(last_raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use sentinel_model::DiagnosisCategory;

    /// Replays a fixed sequence of responses, recording prompts.
    struct ScriptedClient {
        responses: Mutex<Vec<Result<String, ModelError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().push(prompt.to_string());
            self.responses.lock().remove(0)
        }
    }

    fn context() -> DiagnosticContext {
        DiagnosticContext {
            statement_text: "SELECT revenue / orders FROM sales".to_string(),
            error_message: "Division by zero".to_string(),
            object_ddls: vec![],
        }
    }

    const GOOD: &str =
        "ROOT CAUSE: zero denominator\nFIXED SQL: SELECT 1\nEXPLANATION: guarded";

    #[tokio::test]
    async fn clean_response_diagnoses_in_one_attempt() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(GOOD.to_string())]));
        let engine = DiagnosisEngine::new(client, EngineConfig::default());

        let d = engine.diagnose(&context()).await.unwrap();
        assert_eq!(d.completeness, Completeness::Complete);
        assert_eq!(d.attempts_used, 1);
        assert_eq!(d.category, DiagnosisCategory::DivisionByZero);
        assert_eq!(d.fixed_statement.as_deref(), Some("SELECT 1"));
        assert_eq!(d.raw_response, None);
    }

    #[tokio::test]
    async fn malformed_then_corrected_uses_one_retry() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok("ROOT CAUSE: zero denominator\nEXPLANATION: guarded".to_string()),
            Ok(GOOD.to_string()),
        ]));
        let engine = DiagnosisEngine::new(client.clone(), EngineConfig::default());

        let d = engine.diagnose(&context()).await.unwrap();
        assert_eq!(d.completeness, Completeness::Complete);
        assert_eq!(d.attempts_used, 2);

        // The retry prompt must call out the missing section.
        let prompts = client.prompts.lock();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("FIXED SQL"));
        assert!(prompts[1].contains("missing"));
    }

    #[tokio::test]
    async fn exhausted_retries_yield_incomplete_with_audit_trail() {
        let junk = "no sections here".to_string();
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(junk.clone()),
            Ok(junk.clone()),
            Ok(junk.clone()),
        ]));
        let engine = DiagnosisEngine::new(client, EngineConfig::default());

        let d = engine.diagnose(&context()).await.unwrap();
        assert_eq!(d.completeness, Completeness::Incomplete);
        assert_eq!(d.attempts_used, 3);
        assert_eq!(d.raw_response.as_deref(), Some("no sections here"));
        // Classification still happened, independent of the model.
        assert_eq!(d.category, DiagnosisCategory::DivisionByZero);
    }

    #[tokio::test]
    async fn transport_failure_escapes_as_error() {
        let client = Arc::new(ScriptedClient::new(vec![Err(ModelError::Transient(
            "connection reset".to_string(),
        ))]));
        let engine = DiagnosisEngine::new(client, EngineConfig::default());

        let err = engine.diagnose(&context()).await.unwrap_err();
        assert!(matches!(err, DiagnosisError::Model(ModelError::Transient(_))));
    }

    #[tokio::test]
    async fn fix_requiring_category_without_fix_is_incomplete() {
        let response = "ROOT CAUSE: zero denominator\nFIXED SQL: NONE\nEXPLANATION: cannot fix";
        let client = Arc::new(ScriptedClient::new(vec![Ok(response.to_string())]));
        let engine = DiagnosisEngine::new(client, EngineConfig::default());

        let d = engine.diagnose(&context()).await.unwrap();
        assert_eq!(d.completeness, Completeness::Incomplete);
        assert_eq!(d.fixed_statement, None);
    }
}
