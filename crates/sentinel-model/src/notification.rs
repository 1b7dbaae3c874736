//! Notification records
//!
//! A `NotificationRecord` exists only for investigations that passed the
//! approval gate; delivery status is tracked independently of the
//! investigation's lifecycle.

use crate::ids::InvestigationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendered payload handed to the external channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Subject line
    pub subject: String,
    /// Body text
    pub body: String,
    /// Incident reference (short fingerprint) for correlation
    pub incident_reference: String,
}

/// Delivery status of one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    /// Not yet handed to the channel
    Pending,
    /// Channel accepted the payload
    Sent,
    /// Retries exhausted without acceptance
    Failed,
}

/// Record of one notification attempt chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Investigation this notification belongs to
    pub investigation_id: InvestigationId,
    /// Rendered payload
    pub payload: NotificationPayload,
    /// Current delivery status
    pub status: DeliveryStatus,
    /// Delivery attempts made so far
    pub attempts: u32,
    /// When the payload was accepted, if it was
    pub sent_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// Create a pending record for an approved investigation
    #[must_use]
    pub fn pending(investigation_id: InvestigationId, payload: NotificationPayload) -> Self {
        Self {
            investigation_id,
            payload,
            status: DeliveryStatus::Pending,
            attempts: 0,
            sent_at: None,
        }
    }

    /// Mark one successful delivery
    pub fn mark_sent(&mut self) {
        self.status = DeliveryStatus::Sent;
        self.sent_at = Some(Utc::now());
    }

    /// Mark the record failed after retries exhausted
    pub fn mark_failed(&mut self) {
        self.status = DeliveryStatus::Failed;
    }
}
