// ABOUTME: Reschedule negotiation models: preview, stored request and commit outcome
// ABOUTME: A request moves pending -> approved | rejected and never returns to pending
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meet::{MeetEvent, ParticipantRole};

/// Negotiation state of a reschedule request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RescheduleStatus {
    /// Waiting for the counterparty
    #[default]
    Pending,
    /// Counterparty agreed; the meet was moved
    Approved,
    /// Counterparty refused, or the request was cleared
    Rejected,
}

impl RescheduleStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

/// Proposed new slot shown to the requester before committing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReschedulePreview {
    /// Meet being moved
    pub event_id: Uuid,
    /// New inclusive start
    pub to_start: DateTime<Utc>,
    /// New exclusive end
    pub to_end: DateTime<Utc>,
    /// `to_start` as RFC 3339
    pub to_start_iso: String,
    /// `to_end` as RFC 3339
    pub to_end_iso: String,
    /// Optional message for the counterparty
    pub note: Option<String>,
}

/// A proposed time change awaiting counterparty approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleRequest {
    /// Unique identifier
    pub id: Uuid,
    /// Meet being moved
    pub event_id: Uuid,
    /// Proposing user
    pub requested_by_user_id: String,
    /// Side the proposer acts for
    pub requested_by_role: ParticipantRole,
    /// Start of the meet when proposed
    pub from_start_time: DateTime<Utc>,
    /// End of the meet when proposed
    pub from_end_time: DateTime<Utc>,
    /// Proposed start
    pub to_start_time: DateTime<Utc>,
    /// Proposed end
    pub to_end_time: DateTime<Utc>,
    /// Optional message for the counterparty
    pub note: Option<String>,
    /// Negotiation state
    pub status: RescheduleStatus,
    /// Counterparty who approved or rejected
    pub responded_by_user_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl RescheduleRequest {
    /// Build a pending request moving `event` to the previewed slot
    #[must_use]
    pub fn propose(
        event: &MeetEvent,
        preview: &ReschedulePreview,
        requester_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: event.id,
            requested_by_user_id: requester_id.to_owned(),
            requested_by_role: event.role_of(requester_id),
            from_start_time: event.start_time,
            from_end_time: event.end_time,
            to_start_time: preview.to_start,
            to_end_time: preview.to_end,
            note: preview.note.clone(),
            status: RescheduleStatus::Pending,
            responded_by_user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the request still awaits a response
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RescheduleStatus::Pending
    }

    /// Whether `event` still sits on the slot this request moves away from
    #[must_use]
    pub fn matches_current_slot(&self, event: &MeetEvent) -> bool {
        event.start_time == self.from_start_time && event.end_time == self.from_end_time
    }
}

/// Result of committing a reschedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The meet was moved directly
    Applied {
        /// Meet with its new times
        event: MeetEvent,
    },
    /// A request now waits for the counterparty
    PendingApproval {
        /// The stored request
        request: RescheduleRequest,
    },
}

impl CommitOutcome {
    /// Whether the change took effect immediately
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
