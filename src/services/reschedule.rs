// ABOUTME: Reschedule negotiation: preview, fast-path apply or pending request, then approve/reject
// ABOUTME: Meet times only change through a version-checked update inside one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Reschedule protocol
//!
//! ```text
//!  no-request --(propose)--> pending --(approve)--> applied
//!                  |                 \--(reject)---> no-request
//!                  \--(requester is the only one engaged)--> applied
//! ```
//!
//! The fast path applies when the requester's own row is the still-pending
//! self-invite of the creator and nobody else has accepted. Everything else is
//! negotiated: a pending request is stored and the meet stays where it is until
//! the counterparty approves. A meet has at most one pending request; a second
//! proposal fails with `AlreadyPending` instead of replacing the first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{has_standing, require_user_id};
use crate::database::{Database, EventStore, RescheduleStore, TransactionGuard};
use crate::errors::{AppError, AppResult};
use crate::logging::MeetLogger;
use crate::models::{
    CommitOutcome, MeetEvent, Participant, RescheduleRequest, ReschedulePreview,
    RescheduleStatus, RsvpStatus,
};
use crate::notifications::{dispatch, MeetNotification, NotificationSink};

/// Moves meets, directly or through counterparty approval
pub struct RescheduleService {
    database: Database,
    requests: RescheduleStore,
    notifier: Arc<dyn NotificationSink>,
}

impl RescheduleService {
    /// Create a reschedule service
    #[must_use]
    pub fn new(database: Database, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            requests: RescheduleStore::new(database.pool().clone()),
            database,
            notifier,
        }
    }

    /// Build the confirmation preview for a proposed slot; touches no storage
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the slot is empty or inverted, or
    /// `MissingRequiredField` if the requester is blank
    pub fn preview_reschedule(
        event_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        requester_id: &str,
        note: Option<&str>,
    ) -> AppResult<ReschedulePreview> {
        require_user_id(requester_id, "requester_id")?;
        if new_end <= new_start {
            return Err(AppError::invalid_input(format!(
                "Reschedule end {new_end} must be after start {new_start}"
            )));
        }
        Ok(ReschedulePreview {
            event_id,
            to_start: new_start,
            to_end: new_end,
            to_start_iso: new_start.to_rfc3339(),
            to_end_iso: new_end.to_rfc3339(),
            note: note
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
        })
    }

    /// Commit a previewed reschedule
    ///
    /// The new slot must keep the meet's booked length.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the preview belongs to another meet or changes its length
    /// - `PermissionDenied` if the requester has no standing on the meet
    /// - `AlreadyPending` if a negotiated request already awaits approval
    /// - `InvalidState` if the meet is cancelled or completed
    /// - `ConcurrentModification` if the meet changed while committing
    /// - `StorageError` if any write fails; nothing is persisted then
    pub async fn commit_reschedule(
        &self,
        event_id: Uuid,
        preview: &ReschedulePreview,
        requester_id: &str,
    ) -> AppResult<CommitOutcome> {
        let requester_id = require_user_id(requester_id, "requester_id")?;
        if preview.event_id != event_id {
            return Err(AppError::invalid_input(format!(
                "Preview belongs to meet {}, not {event_id}",
                preview.event_id
            )));
        }
        if preview.to_end <= preview.to_start {
            return Err(AppError::invalid_input("Reschedule end must be after start"));
        }

        let mut guard = TransactionGuard::begin(self.database.pool(), "commit_reschedule").await?;
        let event = load_scheduled_event(guard.executor()?, event_id).await?;
        let proposed = preview.to_end - preview.to_start;
        if proposed != event.duration() {
            return Err(AppError::invalid_input(format!(
                "Reschedule must keep the meet length of {} minutes, got {} minutes",
                event.duration_minutes(),
                proposed.num_minutes()
            )));
        }
        let participants = EventStore::list_participants_in(guard.executor()?, event_id).await?;

        if !has_standing(&event, &participants, requester_id) {
            MeetLogger::log_reschedule_event(requester_id, &event_id.to_string(), "commit", "denied");
            return Err(AppError::permission_denied(format!(
                "User has no standing on meet {event_id}"
            ))
            .with_user_id(requester_id));
        }

        if holds_sole_authority(&participants, requester_id) {
            self.apply_directly(guard, &event, preview, requester_id).await
        } else {
            self.propose(guard, &event, preview, requester_id).await
        }
    }

    /// Fast path: move the meet now and clear any in-flight request
    async fn apply_directly(
        &self,
        mut guard: TransactionGuard,
        event: &MeetEvent,
        preview: &ReschedulePreview,
        requester_id: &str,
    ) -> AppResult<CommitOutcome> {
        let moved = EventStore::update_times_in(
            guard.executor()?,
            event.id,
            preview.to_start,
            preview.to_end,
            event.version,
        )
        .await?;
        if !moved {
            return Err(AppError::concurrent_modification(format!("Meet {}", event.id)));
        }
        let cleared =
            RescheduleStore::clear_pending_for_event_in(guard.executor()?, event.id, requester_id)
                .await?;
        let updated = load_scheduled_event(guard.executor()?, event.id).await?;
        guard.commit().await?;

        MeetLogger::log_reschedule_event(
            requester_id,
            &event.id.to_string(),
            "commit",
            &format!("applied (cleared {cleared} pending)"),
        );
        dispatch(
            self.notifier.as_ref(),
            MeetNotification::RescheduleApplied {
                event_id: event.id,
                applied_by_user_id: requester_id.to_owned(),
                start_time: updated.start_time,
                end_time: updated.end_time,
            },
        )
        .await;
        Ok(CommitOutcome::Applied { event: updated })
    }

    /// Negotiated path: store a pending request and leave the meet untouched
    async fn propose(
        &self,
        mut guard: TransactionGuard,
        event: &MeetEvent,
        preview: &ReschedulePreview,
        requester_id: &str,
    ) -> AppResult<CommitOutcome> {
        if RescheduleStore::find_pending_for_event_in(guard.executor()?, event.id)
            .await?
            .is_some()
        {
            MeetLogger::log_reschedule_event(
                requester_id,
                &event.id.to_string(),
                "commit",
                "already_pending",
            );
            return Err(AppError::already_pending(event.id.to_string()));
        }

        let request = RescheduleRequest::propose(event, preview, requester_id, Utc::now());
        RescheduleStore::insert_in(guard.executor()?, &request).await?;
        guard.commit().await?;

        MeetLogger::log_reschedule_event(
            requester_id,
            &event.id.to_string(),
            "commit",
            "pending_approval",
        );
        dispatch(
            self.notifier.as_ref(),
            MeetNotification::RescheduleRequested {
                request_id: request.id,
                event_id: event.id,
                requested_by_user_id: request.requested_by_user_id.clone(),
                to_start_time: request.to_start_time,
                to_end_time: request.to_end_time,
            },
        )
        .await;
        Ok(CommitOutcome::PendingApproval { request })
    }

    /// Approve a pending request and move the meet to the proposed slot
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the request does not exist
    /// - `InvalidState` if the request is no longer pending or the meet is not scheduled
    /// - `PermissionDenied` if the approver is the requester or has no standing
    /// - `ConcurrentModification` if the meet moved since the request was made
    pub async fn approve_reschedule(
        &self,
        request_id: Uuid,
        approver_id: &str,
    ) -> AppResult<MeetEvent> {
        let approver_id = require_user_id(approver_id, "approver_id")?;
        let mut guard =
            TransactionGuard::begin(self.database.pool(), "approve_reschedule").await?;
        let (request, event) = load_answerable(guard.executor()?, request_id, approver_id).await?;

        if !request.matches_current_slot(&event) {
            return Err(AppError::concurrent_modification(format!(
                "Meet {}",
                event.id
            )));
        }
        let moved = EventStore::update_times_in(
            guard.executor()?,
            event.id,
            request.to_start_time,
            request.to_end_time,
            event.version,
        )
        .await?;
        if !moved {
            return Err(AppError::concurrent_modification(format!("Meet {}", event.id)));
        }
        if !RescheduleStore::resolve_in(
            guard.executor()?,
            request_id,
            RescheduleStatus::Approved,
            approver_id,
        )
        .await?
        {
            return Err(AppError::invalid_state(format!(
                "Reschedule request {request_id} was already answered"
            )));
        }
        let updated = load_scheduled_event(guard.executor()?, event.id).await?;
        guard.commit().await?;

        MeetLogger::log_reschedule_event(approver_id, &event.id.to_string(), "approve", "applied");
        dispatch(
            self.notifier.as_ref(),
            MeetNotification::RescheduleResolved {
                request_id,
                event_id: event.id,
                status: RescheduleStatus::Approved,
                responded_by_user_id: approver_id.to_owned(),
            },
        )
        .await;
        Ok(updated)
    }

    /// Reject a pending request; the meet keeps its times
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::approve_reschedule`], minus the slot check
    pub async fn reject_reschedule(
        &self,
        request_id: Uuid,
        responder_id: &str,
    ) -> AppResult<RescheduleRequest> {
        let responder_id = require_user_id(responder_id, "responder_id")?;
        let mut guard = TransactionGuard::begin(self.database.pool(), "reject_reschedule").await?;
        let (mut request, event) =
            load_answerable(guard.executor()?, request_id, responder_id).await?;

        if !RescheduleStore::resolve_in(
            guard.executor()?,
            request_id,
            RescheduleStatus::Rejected,
            responder_id,
        )
        .await?
        {
            return Err(AppError::invalid_state(format!(
                "Reschedule request {request_id} was already answered"
            )));
        }
        guard.commit().await?;

        request.status = RescheduleStatus::Rejected;
        request.responded_by_user_id = Some(responder_id.to_owned());
        request.updated_at = Utc::now();

        MeetLogger::log_reschedule_event(responder_id, &event.id.to_string(), "reject", "rejected");
        dispatch(
            self.notifier.as_ref(),
            MeetNotification::RescheduleResolved {
                request_id,
                event_id: event.id,
                status: RescheduleStatus::Rejected,
                responded_by_user_id: responder_id.to_owned(),
            },
        )
        .await;
        Ok(request)
    }

    /// Pending requests waiting for `user_id` to answer
    ///
    /// # Errors
    ///
    /// Returns an error if the requests cannot be read
    pub async fn list_pending_reschedules(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<RescheduleRequest>> {
        let user_id = require_user_id(user_id, "user_id")?;
        self.requests.list_pending_for_user(user_id).await
    }

    /// Full request history of a meet
    ///
    /// # Errors
    ///
    /// Returns an error if the requests cannot be read
    pub async fn list_requests_for_meet(
        &self,
        event_id: Uuid,
    ) -> AppResult<Vec<RescheduleRequest>> {
        self.requests.list_for_event(event_id).await
    }
}

/// Fast-path rule: the requester is the unconfirmed creator and nobody else accepted
fn holds_sole_authority(participants: &[Participant], requester_id: &str) -> bool {
    let own_unconfirmed = participants
        .iter()
        .any(|p| p.user_id == requester_id && p.is_unconfirmed_self_invite());
    let counterparty_engaged = participants
        .iter()
        .any(|p| p.user_id != requester_id && p.rsvp_status == RsvpStatus::Accepted);
    own_unconfirmed && !counterparty_engaged
}

async fn load_scheduled_event(
    conn: &mut SqliteConnection,
    event_id: Uuid,
) -> AppResult<MeetEvent> {
    let event = EventStore::get_event_in(conn, event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Meet {event_id}")))?;
    if !event.is_scheduled() {
        return Err(AppError::invalid_state(format!(
            "Meet {event_id} is {}",
            event.status.as_str()
        )));
    }
    Ok(event)
}

/// Load a pending request and its meet, checking the responder may answer it
async fn load_answerable(
    conn: &mut SqliteConnection,
    request_id: Uuid,
    responder_id: &str,
) -> AppResult<(RescheduleRequest, MeetEvent)> {
    let request = RescheduleStore::get_in(conn, request_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reschedule request {request_id}")))?;
    if !request.is_pending() {
        return Err(AppError::invalid_state(format!(
            "Reschedule request {request_id} is {}",
            request.status.as_str()
        )));
    }

    let event = load_scheduled_event(conn, request.event_id).await?;
    let participants = EventStore::list_participants_in(conn, event.id).await?;
    if request.requested_by_user_id == responder_id
        || !has_standing(&event, &participants, responder_id)
    {
        return Err(AppError::permission_denied(format!(
            "User cannot answer reschedule request {request_id}"
        ))
        .with_user_id(responder_id));
    }
    Ok((request, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn rows(event_id: Uuid) -> Vec<Participant> {
        let now = Utc::now();
        vec![Participant::creator(event_id, "client", now)]
    }

    #[test]
    fn test_preview_rejects_inverted_slot() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        let result =
            RescheduleService::preview_reschedule(Uuid::new_v4(), start, start, "client", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_preview_formats_iso_and_trims_note() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        let preview = RescheduleService::preview_reschedule(
            Uuid::new_v4(),
            start,
            start + Duration::minutes(30),
            "client",
            Some("  running late  "),
        )
        .unwrap();
        assert_eq!(preview.to_start_iso, "2025-06-02T14:00:00+00:00");
        assert_eq!(preview.note.as_deref(), Some("running late"));
    }

    #[test]
    fn test_sole_authority_lost_once_counterparty_accepts() {
        let event_id = Uuid::new_v4();
        let mut participants = rows(event_id);
        assert!(holds_sole_authority(&participants, "client"));
        assert!(!holds_sole_authority(&participants, "coach"));

        let mut coach = Participant::creator(event_id, "coach", Utc::now());
        coach.invited_by_user_id = "client".to_owned();
        coach.rsvp_status = RsvpStatus::Accepted;
        participants.push(coach);
        assert!(!holds_sole_authority(&participants, "client"));
    }
}
