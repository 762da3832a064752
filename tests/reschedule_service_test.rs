// ABOUTME: Integration tests for reschedule negotiation
// ABOUTME: Fast path, negotiated requests, idempotent commits, approval and rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used, clippy::panic)]

mod common;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use common::{count_rows, create_file_database, setup, TestServices, CLIENT, COACH};
use pierre_meets::errors::ErrorCode;
use pierre_meets::models::{
    CommitOutcome, MeetEvent, ParticipantRole, ReschedulePreview, RescheduleRequest,
    RescheduleStatus,
};
use pierre_meets::services::RescheduleService;
use tempfile::TempDir;
use uuid::Uuid;

fn preview_for(event: &MeetEvent, user: &str, shift_hours: i64) -> ReschedulePreview {
    let start: DateTime<Utc> = event.start_time + Duration::hours(shift_hours);
    RescheduleService::preview_reschedule(
        event.id,
        start,
        start + Duration::minutes(30),
        user,
        Some("can we move this?"),
    )
    .unwrap()
}

async fn propose(services: &TestServices, event: &MeetEvent, user: &str) -> RescheduleRequest {
    let preview = preview_for(event, user, 24);
    match services
        .reschedule
        .commit_reschedule(event.id, &preview, user)
        .await
        .unwrap()
    {
        CommitOutcome::PendingApproval { request } => request,
        CommitOutcome::Applied { .. } => panic!("expected a negotiated request"),
    }
}

async fn booked_and_accepted(services: &TestServices) -> MeetEvent {
    let event = services.book_meet().await;
    services
        .attendance
        .respond_to_invitation(event.id, COACH, true)
        .await
        .unwrap();
    event
}

#[tokio::test]
async fn test_creator_alone_moves_meet_directly() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;
    let preview = preview_for(&event, CLIENT, 2);

    let outcome = services
        .reschedule
        .commit_reschedule(event.id, &preview, CLIENT)
        .await?;

    let CommitOutcome::Applied { event: moved } = outcome else {
        panic!("expected the fast path");
    };
    assert_eq!(moved.start_time, preview.to_start);
    assert_eq!(moved.end_time, preview.to_end);
    assert_eq!(moved.version, event.version + 1);
    assert_eq!(count_rows(&services.database, "meet_reschedule_requests").await, 0);

    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, preview.to_start);
    assert_eq!(
        services.sink.kinds(),
        vec!["booking_confirmed", "reschedule_applied"]
    );
    Ok(())
}

#[tokio::test]
async fn test_accepted_coach_forces_negotiation() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let preview = preview_for(&event, CLIENT, 24);

    let outcome = services
        .reschedule
        .commit_reschedule(event.id, &preview, CLIENT)
        .await?;

    let CommitOutcome::PendingApproval { request } = outcome else {
        panic!("expected a pending request");
    };
    assert_eq!(request.status, RescheduleStatus::Pending);
    assert_eq!(request.requested_by_user_id, CLIENT);
    assert_eq!(request.requested_by_role, ParticipantRole::Client);
    assert_eq!(request.from_start_time, event.start_time);
    assert_eq!(request.from_end_time, event.end_time);
    assert_eq!(request.to_start_time, preview.to_start);
    assert_eq!(request.to_end_time, preview.to_end);
    assert_eq!(request.note.as_deref(), Some("can we move this?"));

    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);
    assert_eq!(stored.end_time, event.end_time);
    assert!(services.sink.kinds().contains(&"reschedule_requested"));
    Ok(())
}

#[tokio::test]
async fn test_coach_proposal_is_negotiated() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;

    let request = propose(&services, &event, COACH).await;

    assert_eq!(request.requested_by_role, ParticipantRole::Coach);
    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);
    Ok(())
}

#[tokio::test]
async fn test_coach_without_rsvp_still_negotiates() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;

    let request = propose(&services, &event, COACH).await;
    assert_eq!(request.status, RescheduleStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn test_second_commit_while_pending_is_rejected() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let preview = preview_for(&event, CLIENT, 24);

    services
        .reschedule
        .commit_reschedule(event.id, &preview, CLIENT)
        .await?;
    let err = services
        .reschedule
        .commit_reschedule(event.id, &preview, CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyPending);

    let counter = preview_for(&event, COACH, 48);
    let err = services
        .reschedule
        .commit_reschedule(event.id, &counter, COACH)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyPending);

    assert_eq!(count_rows(&services.database, "meet_reschedule_requests").await, 1);
    Ok(())
}

#[tokio::test]
async fn test_fast_path_clears_in_flight_request() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;
    let coach_request = propose(&services, &event, COACH).await;

    let preview = preview_for(&event, CLIENT, 3);
    let outcome = services
        .reschedule
        .commit_reschedule(event.id, &preview, CLIENT)
        .await?;
    assert!(outcome.is_applied());

    let cleared = services
        .reschedule
        .list_requests_for_meet(event.id)
        .await?
        .into_iter()
        .find(|r| r.id == coach_request.id)
        .unwrap();
    assert_eq!(cleared.status, RescheduleStatus::Rejected);
    assert!(services
        .reschedule
        .list_pending_reschedules(CLIENT)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stranger_cannot_reschedule() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;
    let preview = preview_for(&event, "stranger", 2);

    let err = services
        .reschedule
        .commit_reschedule(event.id, &preview, "stranger")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::PermissionDenied);
    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);
    Ok(())
}

#[tokio::test]
async fn test_commit_validates_preview_and_event() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;
    let preview = preview_for(&event, CLIENT, 2);

    let err = services
        .reschedule
        .commit_reschedule(Uuid::new_v4(), &preview, CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut orphan = preview.clone();
    orphan.event_id = Uuid::new_v4();
    let err = services
        .reschedule
        .commit_reschedule(orphan.event_id, &orphan, CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_meet_cannot_move() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;
    services.attendance.cancel_meet(event.id, CLIENT).await?;

    let err = services
        .reschedule
        .commit_reschedule(event.id, &preview_for(&event, CLIENT, 2), CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    Ok(())
}

#[tokio::test]
async fn test_counterparty_approval_moves_meet() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let request = propose(&services, &event, CLIENT).await;

    let inbox = services.reschedule.list_pending_reschedules(COACH).await?;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, request.id);
    assert!(services
        .reschedule
        .list_pending_reschedules(CLIENT)
        .await?
        .is_empty());

    let moved = services
        .reschedule
        .approve_reschedule(request.id, COACH)
        .await?;
    assert_eq!(moved.start_time, request.to_start_time);
    assert_eq!(moved.end_time, request.to_end_time);

    let resolved = services
        .reschedule
        .list_requests_for_meet(event.id)
        .await?
        .pop()
        .unwrap();
    assert_eq!(resolved.status, RescheduleStatus::Approved);
    assert_eq!(resolved.responded_by_user_id.as_deref(), Some(COACH));
    assert!(services.sink.kinds().contains(&"reschedule_resolved"));

    let err = services
        .reschedule
        .approve_reschedule(request.id, COACH)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    Ok(())
}

#[tokio::test]
async fn test_requester_cannot_answer_own_request() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let request = propose(&services, &event, CLIENT).await;

    let err = services
        .reschedule
        .approve_reschedule(request.id, CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = services
        .reschedule
        .reject_reschedule(request.id, "stranger")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    Ok(())
}

#[tokio::test]
async fn test_rejection_keeps_times_and_reopens_negotiation() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let request = propose(&services, &event, CLIENT).await;

    let rejected = services
        .reschedule
        .reject_reschedule(request.id, COACH)
        .await?;
    assert_eq!(rejected.status, RescheduleStatus::Rejected);
    assert_eq!(rejected.responded_by_user_id.as_deref(), Some(COACH));

    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);

    let again = propose(&services, &event, CLIENT).await;
    assert_ne!(again.id, request.id);
    Ok(())
}

#[tokio::test]
async fn test_approval_fails_when_meet_moved_meanwhile() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;
    let request = propose(&services, &event, CLIENT).await;

    let shifted = event.start_time + Duration::hours(5);
    sqlx::query("UPDATE meet_events SET start_time = $1, version = version + 1 WHERE id = $2")
        .bind(shifted.to_rfc3339())
        .bind(event.id.to_string())
        .execute(services.database.pool())
        .await?;

    let err = services
        .reschedule
        .approve_reschedule(request.id, COACH)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ConcurrentModification);

    let still_pending = services
        .reschedule
        .list_pending_reschedules(COACH)
        .await?;
    assert_eq!(still_pending.len(), 1);
    Ok(())
}

fn resized_preview(event: &MeetEvent, user: &str, minutes: i64) -> ReschedulePreview {
    let start = event.start_time + Duration::hours(4);
    RescheduleService::preview_reschedule(
        event.id,
        start,
        start + Duration::minutes(minutes),
        user,
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fast_path_keeps_meet_length() -> Result<()> {
    let services = setup().await?;
    let event = services.book_meet().await;

    for minutes in [7, 45] {
        let err = services
            .reschedule
            .commit_reschedule(event.id, &resized_preview(&event, CLIENT, minutes), CLIENT)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);
    assert_eq!(stored.duration_minutes(), 30);
    assert_eq!(stored.version, event.version);
    Ok(())
}

#[tokio::test]
async fn test_negotiated_path_keeps_meet_length() -> Result<()> {
    let services = setup().await?;
    let event = booked_and_accepted(&services).await;

    let err = services
        .reschedule
        .commit_reschedule(event.id, &resized_preview(&event, CLIENT, 7), CLIENT)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(count_rows(&services.database, "meet_reschedule_requests").await, 0);

    let request = propose(&services, &event, CLIENT).await;
    assert_eq!(request.to_end_time - request.to_start_time, event.duration());
    let moved = services
        .reschedule
        .approve_reschedule(request.id, COACH)
        .await?;
    assert_eq!(moved.duration_minutes(), 30);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_negotiated_commits_leave_one_pending_request() -> Result<()> {
    let dir = TempDir::new()?;
    let services = Arc::new(TestServices::new(create_file_database(&dir).await?));
    let event = booked_and_accepted(&services).await;

    let handles: Vec<_> = (0..8_i64)
        .map(|i| {
            let services = Arc::clone(&services);
            let event = event.clone();
            let user = if i % 2 == 0 { CLIENT } else { COACH };
            tokio::spawn(async move {
                let preview = preview_for(&event, user, 24 + i);
                services
                    .reschedule
                    .commit_reschedule(event.id, &preview, user)
                    .await
            })
        })
        .collect();

    let mut proposed = 0;
    for handle in handles {
        match handle.await? {
            Ok(outcome) => {
                assert!(!outcome.is_applied());
                proposed += 1;
            }
            Err(e) => assert_eq!(e.code, ErrorCode::AlreadyPending),
        }
    }

    assert_eq!(proposed, 1);
    assert_eq!(count_rows(&services.database, "meet_reschedule_requests").await, 1);
    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.start_time, event.start_time);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fast_path_commits_serialize_on_version() -> Result<()> {
    let dir = TempDir::new()?;
    let services = Arc::new(TestServices::new(create_file_database(&dir).await?));
    let event = services.book_meet().await;

    let handles: Vec<_> = (1..=6_i64)
        .map(|i| {
            let services = Arc::clone(&services);
            let event = event.clone();
            tokio::spawn(async move {
                let preview = preview_for(&event, CLIENT, i);
                services
                    .reschedule
                    .commit_reschedule(event.id, &preview, CLIENT)
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await??.is_applied());
    }

    let (stored, _) = services.attendance.get_meet(event.id).await?;
    assert_eq!(stored.version, event.version + 6);
    assert_eq!(stored.duration_minutes(), 30);
    assert_eq!(count_rows(&services.database, "meet_reschedule_requests").await, 0);
    Ok(())
}
