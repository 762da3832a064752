// ABOUTME: Storage for meet events and their participant RSVP rows
// ABOUTME: Version-checked updates implement optimistic concurrency on meet times and status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{
    MeetEvent, MeetEventStatus, MeetEventType, Participant, ParticipantRole, RsvpStatus,
};

const EVENT_COLUMNS: &str = r"
    id, coach_id, created_by_user_id, title, description, start_time, end_time,
    event_type, status, activity_id, version, created_at, updated_at
";

/// Meet event and participant database operations
#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    /// Create a new event store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new meet
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_event(conn: &mut SqliteConnection, event: &MeetEvent) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO meet_events (
                id, coach_id, created_by_user_id, title, description, start_time, end_time,
                event_type, status, activity_id, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(event.id.to_string())
        .bind(&event.coach_id)
        .bind(&event.created_by_user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time.to_rfc3339())
        .bind(event.end_time.to_rfc3339())
        .bind(event.event_type.as_str())
        .bind(event.status.as_str())
        .bind(&event.activity_id)
        .bind(event.version)
        .bind(event.created_at.to_rfc3339())
        .bind(event.updated_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to create meet: {e}")))?;
        Ok(())
    }

    /// Insert a participant row; one row per (meet, user)
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a duplicate row
    pub async fn insert_participant(
        conn: &mut SqliteConnection,
        participant: &Participant,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO meet_event_participants (
                event_id, user_id, rsvp_status, invited_by_user_id, invited_by_role,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(participant.event_id.to_string())
        .bind(&participant.user_id)
        .bind(participant.rsvp_status.as_str())
        .bind(&participant.invited_by_user_id)
        .bind(participant.invited_by_role.as_str())
        .bind(participant.created_at.to_rfc3339())
        .bind(participant.updated_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to add meet participant: {e}")))?;
        Ok(())
    }

    /// Get a meet by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_event(&self, event_id: Uuid) -> AppResult<Option<MeetEvent>> {
        let mut conn = self.acquire().await?;
        Self::get_event_in(&mut conn, event_id).await
    }

    /// Get a meet by ID on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_event_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
    ) -> AppResult<Option<MeetEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM meet_events WHERE id = $1"
        ))
        .bind(event_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to get meet: {e}")))?;

        row.map(|r| row_to_event(&r)).transpose()
    }

    /// List meets where the user is the coach or a participant, by start time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_events_for_user(&self, user_id: &str) -> AppResult<Vec<MeetEvent>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {EVENT_COLUMNS} FROM meet_events
            WHERE coach_id = $1
               OR id IN (SELECT event_id FROM meet_event_participants WHERE user_id = $1)
            ORDER BY start_time
            "
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to list meets: {e}")))?;

        rows.iter().map(row_to_event).collect()
    }

    /// List a meet's participant rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_participants(&self, event_id: Uuid) -> AppResult<Vec<Participant>> {
        let mut conn = self.acquire().await?;
        Self::list_participants_in(&mut conn, event_id).await
    }

    /// List a meet's participant rows on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_participants_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
    ) -> AppResult<Vec<Participant>> {
        let rows = sqlx::query(
            r"
            SELECT event_id, user_id, rsvp_status, invited_by_user_id, invited_by_role,
                   created_at, updated_at
            FROM meet_event_participants
            WHERE event_id = $1
            ORDER BY created_at
            ",
        )
        .bind(event_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to list meet participants: {e}")))?;

        rows.iter().map(row_to_participant).collect()
    }

    /// Move a meet, provided nobody changed it since `expected_version`
    ///
    /// Returns `false` when the version check fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_times_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        expected_version: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE meet_events
            SET start_time = $1, end_time = $2, version = version + 1, updated_at = $3
            WHERE id = $4 AND version = $5
            ",
        )
        .bind(start_time.to_rfc3339())
        .bind(end_time.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(event_id.to_string())
        .bind(expected_version)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to move meet: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Transition a meet's status, provided nobody changed it since `expected_version`
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_status_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
        status: MeetEventStatus,
        expected_version: i64,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE meet_events
            SET status = $1, version = version + 1, updated_at = $2
            WHERE id = $3 AND version = $4
            ",
        )
        .bind(status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(event_id.to_string())
        .bind(expected_version)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to update meet status: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a participant's RSVP answer
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_rsvp_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
        user_id: &str,
        rsvp_status: RsvpStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE meet_event_participants
            SET rsvp_status = $1, updated_at = $2
            WHERE event_id = $3 AND user_id = $4
            ",
        )
        .bind(rsvp_status.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(event_id.to_string())
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to update RSVP: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::storage(format!("Failed to acquire connection: {e}")))
    }
}

/// Convert a database row to a `MeetEvent`
fn row_to_event(row: &SqliteRow) -> AppResult<MeetEvent> {
    let id: String = row.get("id");
    let start_time: String = row.get("start_time");
    let end_time: String = row.get("end_time");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(MeetEvent {
        id: parse_uuid(&id, "meet_events.id")?,
        coach_id: row.get("coach_id"),
        created_by_user_id: row.get("created_by_user_id"),
        title: row.get("title"),
        description: row.get("description"),
        start_time: parse_timestamp(&start_time, "meet_events.start_time")?,
        end_time: parse_timestamp(&end_time, "meet_events.end_time")?,
        event_type: MeetEventType::Consultation,
        status: MeetEventStatus::parse(&status),
        activity_id: row.get("activity_id"),
        version: row.get("version"),
        created_at: parse_timestamp(&created_at, "meet_events.created_at")?,
        updated_at: parse_timestamp(&updated_at, "meet_events.updated_at")?,
    })
}

/// Convert a database row to a `Participant`
fn row_to_participant(row: &SqliteRow) -> AppResult<Participant> {
    let event_id: String = row.get("event_id");
    let rsvp_status: String = row.get("rsvp_status");
    let invited_by_role: String = row.get("invited_by_role");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Participant {
        event_id: parse_uuid(&event_id, "meet_event_participants.event_id")?,
        user_id: row.get("user_id"),
        rsvp_status: RsvpStatus::parse(&rsvp_status),
        invited_by_user_id: row.get("invited_by_user_id"),
        invited_by_role: ParticipantRole::parse(&invited_by_role),
        created_at: parse_timestamp(&created_at, "meet_event_participants.created_at")?,
        updated_at: parse_timestamp(&updated_at, "meet_event_participants.updated_at")?,
    })
}
