// ABOUTME: Meet attendance lifecycle: RSVP answers, cancellation, completion and listings
// ABOUTME: Status transitions are version-checked and leave every row in place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{has_standing, require_user_id};
use crate::database::{Database, EventStore, RescheduleStore, TransactionGuard};
use crate::errors::{AppError, AppResult};
use crate::logging::MeetLogger;
use crate::models::{MeetEvent, MeetEventStatus, Participant, ParticipantRole, RsvpStatus};
use crate::notifications::{dispatch, MeetNotification, NotificationSink};

/// RSVP and lifecycle operations on booked meets
pub struct AttendanceService {
    database: Database,
    events: EventStore,
    notifier: Arc<dyn NotificationSink>,
}

impl AttendanceService {
    /// Create an attendance service
    #[must_use]
    pub fn new(database: Database, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            events: EventStore::new(database.pool().clone()),
            database,
            notifier,
        }
    }

    /// Accept or decline a meet
    ///
    /// The coach may answer before holding a participant row; the row is
    /// created then, credited to the meet's creator as inviter.
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the meet does not exist
    /// - `InvalidState` if the meet is cancelled or completed
    /// - `PermissionDenied` if the user is neither a participant nor the coach
    pub async fn respond_to_invitation(
        &self,
        event_id: Uuid,
        user_id: &str,
        accept: bool,
    ) -> AppResult<Participant> {
        let user_id = require_user_id(user_id, "user_id")?;
        let rsvp_status = if accept {
            RsvpStatus::Accepted
        } else {
            RsvpStatus::Declined
        };

        let mut guard = TransactionGuard::begin(self.database.pool(), "respond_to_invitation").await?;
        let event = load_event(guard.executor()?, event_id).await?;
        ensure_scheduled(&event)?;
        let participants = EventStore::list_participants_in(guard.executor()?, event_id).await?;
        let now = Utc::now();

        let participant = if let Some(existing) = participants.iter().find(|p| p.user_id == user_id)
        {
            EventStore::update_rsvp_in(guard.executor()?, event_id, user_id, rsvp_status).await?;
            Participant {
                rsvp_status,
                updated_at: now,
                ..existing.clone()
            }
        } else if event.coach_id == user_id {
            let coach_row = Participant {
                event_id,
                user_id: user_id.to_owned(),
                rsvp_status,
                invited_by_user_id: event.created_by_user_id.clone(),
                invited_by_role: ParticipantRole::Client,
                created_at: now,
                updated_at: now,
            };
            EventStore::insert_participant(guard.executor()?, &coach_row).await?;
            coach_row
        } else {
            return Err(AppError::permission_denied(format!(
                "User is not invited to meet {event_id}"
            ))
            .with_user_id(user_id));
        };
        guard.commit().await?;

        MeetLogger::log_attendance_event(user_id, &event_id.to_string(), rsvp_status.as_str());
        Ok(participant)
    }

    /// Call off a scheduled meet
    ///
    /// Any pending reschedule request is rejected in the same transaction.
    /// Spent credits are not refunded.
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the meet does not exist
    /// - `PermissionDenied` if the user has no standing on the meet
    /// - `InvalidState` if the meet is not scheduled
    /// - `ConcurrentModification` if the meet changed meanwhile
    pub async fn cancel_meet(&self, event_id: Uuid, user_id: &str) -> AppResult<MeetEvent> {
        let user_id = require_user_id(user_id, "user_id")?;
        let mut guard = TransactionGuard::begin(self.database.pool(), "cancel_meet").await?;
        let event = load_event(guard.executor()?, event_id).await?;
        let participants = EventStore::list_participants_in(guard.executor()?, event_id).await?;
        if !has_standing(&event, &participants, user_id) {
            return Err(AppError::permission_denied(format!(
                "User has no standing on meet {event_id}"
            ))
            .with_user_id(user_id));
        }

        let cancelled = transition(&mut guard, &event, MeetEventStatus::Cancelled).await?;
        RescheduleStore::clear_pending_for_event_in(guard.executor()?, event_id, user_id).await?;
        guard.commit().await?;

        MeetLogger::log_attendance_event(user_id, &event_id.to_string(), "cancelled");
        dispatch(
            self.notifier.as_ref(),
            MeetNotification::MeetCancelled {
                event_id,
                cancelled_by_user_id: user_id.to_owned(),
            },
        )
        .await;
        Ok(cancelled)
    }

    /// Mark a meet as held; only its coach may do so
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` if the meet does not exist
    /// - `PermissionDenied` if the user is not the meet's coach
    /// - `InvalidState` if the meet is not scheduled
    pub async fn complete_meet(&self, event_id: Uuid, user_id: &str) -> AppResult<MeetEvent> {
        let user_id = require_user_id(user_id, "user_id")?;
        let mut guard = TransactionGuard::begin(self.database.pool(), "complete_meet").await?;
        let event = load_event(guard.executor()?, event_id).await?;
        if event.coach_id != user_id {
            return Err(AppError::permission_denied(format!(
                "Only the coach can complete meet {event_id}"
            ))
            .with_user_id(user_id));
        }

        let completed = transition(&mut guard, &event, MeetEventStatus::Completed).await?;
        guard.commit().await?;

        MeetLogger::log_attendance_event(user_id, &event_id.to_string(), "completed");
        Ok(completed)
    }

    /// Meets a user coaches or participates in, by start time
    ///
    /// # Errors
    ///
    /// Returns an error if the meets cannot be read
    pub async fn list_meets_for_user(&self, user_id: &str) -> AppResult<Vec<MeetEvent>> {
        let user_id = require_user_id(user_id, "user_id")?;
        self.events.list_events_for_user(user_id).await
    }

    /// A meet with its participant rows
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the meet does not exist
    pub async fn get_meet(&self, event_id: Uuid) -> AppResult<(MeetEvent, Vec<Participant>)> {
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Meet {event_id}")))?;
        let participants = self.events.list_participants(event_id).await?;
        Ok((event, participants))
    }
}

async fn load_event(conn: &mut sqlx::SqliteConnection, event_id: Uuid) -> AppResult<MeetEvent> {
    EventStore::get_event_in(conn, event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Meet {event_id}")))
}

fn ensure_scheduled(event: &MeetEvent) -> AppResult<()> {
    if event.is_scheduled() {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "Meet {} is {}",
            event.id,
            event.status.as_str()
        )))
    }
}

/// Move a scheduled meet to a terminal status and return the stored row
async fn transition(
    guard: &mut TransactionGuard,
    event: &MeetEvent,
    status: MeetEventStatus,
) -> AppResult<MeetEvent> {
    ensure_scheduled(event)?;
    if !EventStore::update_status_in(guard.executor()?, event.id, status, event.version).await? {
        return Err(AppError::concurrent_modification(format!(
            "Meet {}",
            event.id
        )));
    }
    load_event(guard.executor()?, event.id).await
}
