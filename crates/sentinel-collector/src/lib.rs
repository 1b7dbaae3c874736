//! Sentinel Failure Collector
//!
//! Turns the raw failure-event stream into a deduplicated set of
//! incidents keyed by task fingerprint. The fold is pure and
//! order-independent: the same multiset of events produces the same
//! incidents no matter how the source orders them.
//!
//! Events that cannot be keyed (missing/blank task name) are skipped and
//! counted as collection anomalies, never dropped silently. Non-failure
//! records are filtered out up front; they are expected in the feed and
//! are not anomalies.

#![warn(missing_docs)]

use indexmap::IndexMap;
use sentinel_model::{FailureEvent, Fingerprint, Incident};

/// Outcome of one collection pass
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    /// One incident per distinct task, in first-seen order
    pub incidents: IndexMap<Fingerprint, Incident>,
    /// Events excluded for a malformed/missing task name
    pub anomalies: u32,
}

impl CollectionResult {
    /// Whether the window contained no investigable failures
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

/// Fold a window of raw events into deduplicated incidents
///
/// Only `FAILED` records are considered. Each distinct task name yields
/// exactly one incident carrying its most recent event and the count of
/// all events sharing the fingerprint.
#[must_use]
pub fn collect(events: impl IntoIterator<Item = FailureEvent>) -> CollectionResult {
    let mut incidents: IndexMap<Fingerprint, Incident> = IndexMap::new();
    let mut anomalies = 0u32;

    for event in events {
        if !event.is_failure() {
            continue;
        }
        if !event.has_valid_task_name() {
            tracing::warn!(
                query_reference = %event.query_reference,
                "skipping failure event with missing task name"
            );
            anomalies += 1;
            continue;
        }

        let fingerprint = Fingerprint::of_task(&event.task_name);
        match incidents.get_mut(&fingerprint) {
            Some(incident) => incident.absorb(event),
            None => {
                incidents.insert(fingerprint, Incident::first_seen(event));
            }
        }
    }

    // First-seen order depends on input order; key order does not matter
    // to callers, but sorting keeps the fold result canonical.
    incidents.sort_keys();

    tracing::debug!(
        incidents = incidents.len(),
        anomalies,
        "collection pass complete"
    );

    CollectionResult { incidents, anomalies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sentinel_model::TaskState;

    fn event(name: &str, hour: u32) -> FailureEvent {
        FailureEvent {
            task_name: name.to_string(),
            state: TaskState::Failed,
            error_code: Some("100038".to_string()),
            error_message: "Division by zero".to_string(),
            scheduled_time: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            completed_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 1, 0).unwrap()),
            execution_time_seconds: 60.0,
            warehouse_size: "X-Small".to_string(),
            query_reference: format!("qid-{name}-{hour}"),
        }
    }

    #[test]
    fn one_incident_per_distinct_task() {
        let events = vec![
            event("task_broken_division", 1),
            event("task_broken_division", 2),
            event("task_missing_column", 1),
            event("task_missing_column", 3),
            event("task_missing_table", 2),
        ];

        let result = collect(events);

        assert_eq!(result.incidents.len(), 3);
        assert_eq!(result.anomalies, 0);

        let division = &result.incidents[&Fingerprint::of_task("task_broken_division")];
        assert_eq!(division.occurrences, 2);
        assert_eq!(division.latest_event.query_reference, "qid-task_broken_division-2");
    }

    #[test]
    fn non_failures_are_ignored_without_anomaly() {
        let mut ok = event("task_a", 1);
        ok.state = TaskState::Succeeded;

        let result = collect(vec![ok, event("task_a", 2)]);

        assert_eq!(result.incidents.len(), 1);
        assert_eq!(result.anomalies, 0);
        assert_eq!(
            result.incidents[&Fingerprint::of_task("task_a")].occurrences,
            1
        );
    }

    #[test]
    fn blank_task_names_count_as_anomalies() {
        let result = collect(vec![event("  ", 1), event("", 2), event("task_a", 1)]);
        assert_eq!(result.incidents.len(), 1);
        assert_eq!(result.anomalies, 2);
    }

    #[test]
    fn empty_window_is_empty() {
        let result = collect(Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.anomalies, 0);
    }

    proptest! {
        // Same multiset of events => same result regardless of arrival order.
        #[test]
        fn collection_is_order_independent(
            names in proptest::collection::vec("[a-d]", 1..20),
            seed in any::<u64>(),
        ) {
            let events: Vec<FailureEvent> = names
                .iter()
                .enumerate()
                .map(|(i, name)| event(name, u32::try_from(i % 24).unwrap()))
                .collect();

            let mut shuffled = events.clone();
            // Deterministic Fisher-Yates from the seed.
            let mut state = seed;
            for i in (1..shuffled.len()).rev() {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                #[allow(clippy::cast_possible_truncation)]
                let j = (state >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }

            let forward = collect(events);
            let permuted = collect(shuffled);

            prop_assert_eq!(forward.incidents, permuted.incidents);
            prop_assert_eq!(forward.anomalies, permuted.anomalies);
        }
    }
}
