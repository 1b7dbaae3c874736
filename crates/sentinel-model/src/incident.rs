//! Deduplicated incidents
//!
//! One `Incident` per distinct task per collection window, carrying the
//! most recent raw event and the total occurrence count.

use crate::event::FailureEvent;
use crate::ids::Fingerprint;
use serde::{Deserialize, Serialize};

/// Deduplicated failure record for one task within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Stable identity key (derived from the task name)
    pub fingerprint: Fingerprint,
    /// Task name as reported by the platform
    pub task_name: String,
    /// Most recent failure event for this task
    pub latest_event: FailureEvent,
    /// How many raw events share this fingerprint (>= 1)
    pub occurrences: u32,
}

impl Incident {
    /// Create an incident from its first observed event
    #[must_use]
    pub fn first_seen(event: FailureEvent) -> Self {
        let fingerprint = Fingerprint::of_task(&event.task_name);
        Self {
            fingerprint,
            task_name: event.task_name.clone(),
            latest_event: event,
            occurrences: 1,
        }
    }

    /// Fold another event for the same task into this incident
    ///
    /// Keeps whichever event is most recent by `scheduled_time`, breaking
    /// ties on `completed_time` and then `query_reference`, so folding is
    /// order-independent.
    pub fn absorb(&mut self, event: FailureEvent) {
        debug_assert_eq!(self.fingerprint, Fingerprint::of_task(&event.task_name));
        let current = &self.latest_event;
        let newer = (
            event.scheduled_time,
            event.completed_time,
            &event.query_reference,
        ) > (
            current.scheduled_time,
            current.completed_time,
            &current.query_reference,
        );
        if newer {
            self.task_name = event.task_name.clone();
            self.latest_event = event;
        }
        self.occurrences += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TaskState;
    use chrono::{TimeZone, Utc};

    fn event_at(hour: u32) -> FailureEvent {
        FailureEvent {
            task_name: "task_a".to_string(),
            state: TaskState::Failed,
            error_code: None,
            error_message: format!("failure at {hour}"),
            scheduled_time: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            completed_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 30).unwrap()),
            execution_time_seconds: 30.0,
            warehouse_size: "Small".to_string(),
            query_reference: format!("qid-{hour}"),
        }
    }

    #[test]
    fn absorb_keeps_most_recent_regardless_of_order() {
        let mut forward = Incident::first_seen(event_at(1));
        forward.absorb(event_at(2));

        let mut reverse = Incident::first_seen(event_at(2));
        reverse.absorb(event_at(1));

        assert_eq!(forward, reverse);
        assert_eq!(forward.occurrences, 2);
        assert_eq!(forward.latest_event.query_reference, "qid-2");
    }

    #[test]
    fn occurrence_count_tracks_every_event() {
        let mut incident = Incident::first_seen(event_at(1));
        incident.absorb(event_at(2));
        incident.absorb(event_at(3));
        assert_eq!(incident.occurrences, 3);
    }
}
