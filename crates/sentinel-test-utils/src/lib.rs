//! Testing utilities for the Sentinel workspace
//!
//! Shared fixtures, fakes for the external collaborator traits, and a
//! scripted model client.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use sentinel_diagnosis::{ModelClient, ModelError};
use sentinel_model::{FailureEvent, NotificationPayload, TaskState};
use sentinel_pipeline::external::{
    ExternalError, FailureSource, NotificationChannel, StatementContext, WarehouseClient,
};
use std::collections::{HashMap, VecDeque};

pub fn failure_event(task_name: &str, error_message: &str, query_reference: &str) -> FailureEvent {
    FailureEvent {
        task_name: task_name.to_string(),
        state: TaskState::Failed,
        error_code: Some("100038".to_string()),
        error_message: error_message.to_string(),
        scheduled_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        completed_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 2, 0).unwrap()),
        execution_time_seconds: 120.0,
        warehouse_size: "X-Small".to_string(),
        query_reference: query_reference.to_string(),
    }
}

pub fn succeeded_event(task_name: &str) -> FailureEvent {
    FailureEvent {
        state: TaskState::Succeeded,
        ..failure_event(task_name, "", "qid-ok")
    }
}

/// The three canned failures used by the end-to-end demo scenario
pub fn demo_events() -> Vec<FailureEvent> {
    vec![
        failure_event("task_broken_division", "Division by zero", "qid-div-1"),
        failure_event(
            "task_missing_column",
            "SQL compilation error: invalid identifier 'REVENUE'",
            "qid-col-1",
        ),
        failure_event(
            "task_missing_table",
            "Object 'ANALYTICS.SALES' does not exist or not authorized",
            "qid-tab-1",
        ),
    ]
}

/// A response the diagnosis parser accepts
pub fn well_formed_response(root_cause: &str, fix: &str, explanation: &str) -> String {
    format!("ROOT CAUSE: {root_cause}\nFIXED SQL: {fix}\nEXPLANATION: {explanation}")
}

/// Failure source serving a fixed batch of events
pub struct StaticFailureSource {
    events: Vec<FailureEvent>,
}

impl StaticFailureSource {
    pub fn new(events: Vec<FailureEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl FailureSource for StaticFailureSource {
    async fn fetch_events(&self, _lookback_hours: u32) -> Result<Vec<FailureEvent>, ExternalError> {
        Ok(self.events.clone())
    }
}

/// Warehouse fake resolving query references from a fixed map
#[derive(Default)]
pub struct FakeWarehouse {
    contexts: HashMap<String, StatementContext>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statement(mut self, query_reference: &str, statement_text: &str) -> Self {
        self.contexts.insert(
            query_reference.to_string(),
            StatementContext {
                statement_text: statement_text.to_string(),
                object_ddls: vec!["CREATE TABLE t (a INT, b INT);".to_string()],
            },
        );
        self
    }

    /// One statement per demo event
    pub fn for_demo() -> Self {
        Self::new()
            .with_statement("qid-div-1", "SELECT a / b FROM t")
            .with_statement("qid-col-1", "SELECT revenue FROM sales")
            .with_statement("qid-tab-1", "INSERT INTO analytics.sales SELECT * FROM staging")
    }
}

#[async_trait]
impl WarehouseClient for FakeWarehouse {
    async fn statement_context(
        &self,
        query_reference: &str,
    ) -> Result<StatementContext, ExternalError> {
        self.calls.lock().push(query_reference.to_string());
        self.contexts
            .get(query_reference)
            .cloned()
            .ok_or(ExternalError::NotFound)
    }
}

/// Model client replaying a scripted queue of responses
///
/// When the queue runs dry the fallback answers every further prompt;
/// without one the client reports a terminal error.
pub struct ScriptedModelClient {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: Option<String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModelClient {
    pub fn new(responses: Vec<Result<String, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with the same response
    pub fn always(response: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: Some(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(next) = self.responses.lock().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(fallback) => Ok(fallback.clone()),
            None => Err(ModelError::Terminal("script exhausted".to_string())),
        }
    }
}

/// Notification channel recording deliveries, optionally failing first
#[derive(Default)]
pub struct RecordingChannel {
    pub delivered: Mutex<Vec<NotificationPayload>>,
    failures_before_success: Mutex<u32>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(attempts: u32) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failures_before_success: Mutex::new(attempts),
        }
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<(), ExternalError> {
        let mut remaining = self.failures_before_success.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ExternalError::Transient("smtp unavailable".to_string()));
        }
        drop(remaining);
        self.delivered.lock().push(payload.clone());
        Ok(())
    }
}
