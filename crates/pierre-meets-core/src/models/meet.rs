// ABOUTME: Meet event and participant models with their status enumerations
// ABOUTME: A meet is a 1:1 consultation between a coach and a client over a half-open interval
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::identifiers::CONSULTATION_EVENT_TYPE;

/// Lifecycle status of a meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetEventStatus {
    /// Booked and upcoming
    #[default]
    Scheduled,
    /// Called off; rows are kept
    Cancelled,
    /// Took place
    Completed,
}

impl MeetEventStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => Self::Cancelled,
            "completed" => Self::Completed,
            _ => Self::Scheduled,
        }
    }
}

/// Kind of calendar event; the meet engine only creates consultations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetEventType {
    /// 1:1 coach/client consultation
    #[default]
    Consultation,
}

impl MeetEventType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consultation => CONSULTATION_EVENT_TYPE,
        }
    }
}

/// Participant acknowledgment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// Not answered yet
    #[default]
    Pending,
    /// Confirmed attendance
    Accepted,
    /// Refused attendance
    Declined,
}

impl RsvpStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            _ => Self::Pending,
        }
    }
}

/// Side of the coaching relationship a user acts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// The client booking time with a coach
    #[default]
    Client,
    /// The coach being booked
    Coach,
}

impl ParticipantRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Coach => "coach",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "coach" => Self::Coach,
            _ => Self::Client,
        }
    }
}

/// A scheduled 1:1 meet between a coach and a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetEvent {
    /// Unique identifier
    pub id: Uuid,
    /// Coach being met
    pub coach_id: String,
    /// User who booked the meet
    pub created_by_user_id: String,
    /// Display title
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Inclusive start of the slot
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the slot
    pub end_time: DateTime<Utc>,
    /// Always a consultation
    pub event_type: MeetEventType,
    /// Lifecycle status
    pub status: MeetEventStatus,
    /// Purchased product for paid meets
    pub activity_id: Option<String>,
    /// Optimistic concurrency token, bumped on every write
    pub version: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl MeetEvent {
    /// Length of the slot
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Length of the slot in whole minutes
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Whether the meet can still be changed
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.status == MeetEventStatus::Scheduled
    }

    /// Role a user acts in on this meet
    #[must_use]
    pub fn role_of(&self, user_id: &str) -> ParticipantRole {
        if self.coach_id == user_id {
            ParticipantRole::Coach
        } else {
            ParticipantRole::Client
        }
    }
}

/// A user's RSVP row on a meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Owning meet
    pub event_id: Uuid,
    /// Participating user
    pub user_id: String,
    /// Acknowledgment state
    pub rsvp_status: RsvpStatus,
    /// Who put this user on the meet
    pub invited_by_user_id: String,
    /// Role of the inviter
    pub invited_by_role: ParticipantRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// The creator's row: pending, self-invited, as a client
    #[must_use]
    pub fn creator(event_id: Uuid, user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id: user_id.to_owned(),
            rsvp_status: RsvpStatus::Pending,
            invited_by_user_id: user_id.to_owned(),
            invited_by_role: ParticipantRole::Client,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this row is the still-unconfirmed booking of its own creator
    #[must_use]
    pub fn is_unconfirmed_self_invite(&self) -> bool {
        self.rsvp_status == RsvpStatus::Pending && self.invited_by_user_id == self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> MeetEvent {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        MeetEvent {
            id: Uuid::new_v4(),
            coach_id: "coach-1".to_owned(),
            created_by_user_id: "client-1".to_owned(),
            title: "1:1 Meet".to_owned(),
            description: None,
            start_time: start,
            end_time: start + Duration::minutes(30),
            event_type: MeetEventType::Consultation,
            status: MeetEventStatus::Scheduled,
            activity_id: None,
            version: 0,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            MeetEventStatus::Scheduled,
            MeetEventStatus::Cancelled,
            MeetEventStatus::Completed,
        ] {
            assert_eq!(MeetEventStatus::parse(status.as_str()), status);
        }
        assert_eq!(RsvpStatus::parse("declined"), RsvpStatus::Declined);
        assert_eq!(ParticipantRole::parse("coach"), ParticipantRole::Coach);
    }

    #[test]
    fn test_event_duration_and_roles() {
        let event = sample_event();
        assert_eq!(event.duration_minutes(), 30);
        assert_eq!(event.role_of("coach-1"), ParticipantRole::Coach);
        assert_eq!(event.role_of("client-1"), ParticipantRole::Client);
        assert_eq!(event.event_type.as_str(), "consultation");
    }

    #[test]
    fn test_creator_row_is_unconfirmed_self_invite() {
        let event = sample_event();
        let mut creator = Participant::creator(event.id, "client-1", event.created_at);
        assert!(creator.is_unconfirmed_self_invite());
        assert_eq!(creator.invited_by_role, ParticipantRole::Client);

        creator.rsvp_status = RsvpStatus::Accepted;
        assert!(!creator.is_unconfirmed_self_invite());
    }
}
