// ABOUTME: Meet domain services: booking admission, reschedule negotiation and attendance
// ABOUTME: Each operation runs in one transaction and dispatches notifications after commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services are protocol-agnostic: a UI backend, the CLI and the tests all
//! call the same operations. Storage access goes through the store types in
//! [`crate::database`]; while a `TransactionGuard` is open, services only use
//! the connection-level `*_in` functions of those stores.

use crate::errors::{AppError, AppResult};
use crate::models::{MeetEvent, Participant};

/// RSVP answers, cancellation, completion and meet listings
pub mod attendance;
/// Booking admission control
pub mod booking;
/// Reschedule preview, commit and approval
pub mod reschedule;

pub use attendance::AttendanceService;
pub use booking::BookingService;
pub use reschedule::RescheduleService;

/// Whether a user may act on a meet: a participant row, or the meet's coach
pub(crate) fn has_standing(event: &MeetEvent, participants: &[Participant], user_id: &str) -> bool {
    event.coach_id == user_id || participants.iter().any(|p| p.user_id == user_id)
}

/// Reject blank user identifiers before touching storage
pub(crate) fn require_user_id<'a>(user_id: &'a str, field: &str) -> AppResult<&'a str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::{MeetEventStatus, MeetEventType};

    fn event() -> MeetEvent {
        let start = Utc.with_ymd_and_hms(2025, 5, 6, 9, 0, 0).unwrap();
        MeetEvent {
            id: Uuid::new_v4(),
            coach_id: "coach".to_owned(),
            created_by_user_id: "client".to_owned(),
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
    fn test_standing_covers_coach_and_participants() {
        let event = event();
        let participants = vec![Participant::creator(event.id, "client", event.created_at)];

        assert!(has_standing(&event, &participants, "client"));
        assert!(has_standing(&event, &[], "coach"));
        assert!(!has_standing(&event, &participants, "stranger"));
    }

    #[test]
    fn test_blank_user_id_rejected() {
        assert!(require_user_id("  ", "requester_id").is_err());
        assert_eq!(require_user_id(" u1 ", "requester_id").unwrap(), "u1");
    }
}
