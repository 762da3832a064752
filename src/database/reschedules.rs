// ABOUTME: Storage for reschedule requests negotiated between a coach and a client
// ABOUTME: A partial unique index keeps at most one pending request per meet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{ParticipantRole, RescheduleRequest, RescheduleStatus};

const REQUEST_COLUMNS: &str = r"
    id, event_id, requested_by_user_id, requested_by_role,
    from_start_time, from_end_time, to_start_time, to_end_time,
    note, status, responded_by_user_id, created_at, updated_at
";

/// Reschedule request database operations
#[derive(Clone)]
pub struct RescheduleStore {
    pool: SqlitePool,
}

impl RescheduleStore {
    /// Create a new reschedule store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new pending request
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPending` when the meet already has a pending request,
    /// or a storage error if the insert fails
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        request: &RescheduleRequest,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO meet_reschedule_requests (
                id, event_id, requested_by_user_id, requested_by_role,
                from_start_time, from_end_time, to_start_time, to_end_time,
                note, status, responded_by_user_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(request.id.to_string())
        .bind(request.event_id.to_string())
        .bind(&request.requested_by_user_id)
        .bind(request.requested_by_role.as_str())
        .bind(request.from_start_time.to_rfc3339())
        .bind(request.from_end_time.to_rfc3339())
        .bind(request.to_start_time.to_rfc3339())
        .bind(request.to_end_time.to_rfc3339())
        .bind(&request.note)
        .bind(request.status.as_str())
        .bind(&request.responded_by_user_id)
        .bind(request.created_at.to_rfc3339())
        .bind(request.updated_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::already_pending(request.event_id.to_string())
            }
            other => AppError::storage(format!("Failed to create reschedule request: {other}")),
        })?;
        Ok(())
    }

    /// Get a request by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, request_id: Uuid) -> AppResult<Option<RescheduleRequest>> {
        let mut conn = self.acquire().await?;
        Self::get_in(&mut conn, request_id).await
    }

    /// Get a request by ID on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_in(
        conn: &mut SqliteConnection,
        request_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM meet_reschedule_requests WHERE id = $1"
        ))
        .bind(request_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to get reschedule request: {e}")))?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// The pending request of a meet, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_pending_for_event(
        &self,
        event_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>> {
        let mut conn = self.acquire().await?;
        Self::find_pending_for_event_in(&mut conn, event_id).await
    }

    /// The pending request of a meet on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_pending_for_event_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
    ) -> AppResult<Option<RescheduleRequest>> {
        let row = sqlx::query(&format!(
            r"
            SELECT {REQUEST_COLUMNS} FROM meet_reschedule_requests
            WHERE event_id = $1 AND status = 'pending'
            "
        ))
        .bind(event_id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to find pending request: {e}")))?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// All requests ever made for a meet, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_for_event(&self, event_id: Uuid) -> AppResult<Vec<RescheduleRequest>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {REQUEST_COLUMNS} FROM meet_reschedule_requests
            WHERE event_id = $1
            ORDER BY created_at
            "
        ))
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to list reschedule requests: {e}")))?;

        rows.iter().map(row_to_request).collect()
    }

    /// Pending requests a user is expected to answer
    ///
    /// Covers meets the user coaches or participates in, excluding the
    /// user's own proposals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_pending_for_user(&self, user_id: &str) -> AppResult<Vec<RescheduleRequest>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {REQUEST_COLUMNS} FROM meet_reschedule_requests
            WHERE status = 'pending'
              AND requested_by_user_id != $1
              AND event_id IN (
                  SELECT id FROM meet_events WHERE coach_id = $1
                  UNION
                  SELECT event_id FROM meet_event_participants WHERE user_id = $1
              )
            ORDER BY created_at
            "
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to list pending requests: {e}")))?;

        rows.iter().map(row_to_request).collect()
    }

    /// Resolve a pending request; returns `false` if it was no longer pending
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn resolve_in(
        conn: &mut SqliteConnection,
        request_id: Uuid,
        status: RescheduleStatus,
        responded_by_user_id: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE meet_reschedule_requests
            SET status = $1, responded_by_user_id = $2, updated_at = $3
            WHERE id = $4 AND status = 'pending'
            ",
        )
        .bind(status.as_str())
        .bind(responded_by_user_id)
        .bind(Utc::now().to_rfc3339())
        .bind(request_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to resolve reschedule request: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark every pending request of a meet rejected; returns how many were cleared
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn clear_pending_for_event_in(
        conn: &mut SqliteConnection,
        event_id: Uuid,
        cleared_by_user_id: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE meet_reschedule_requests
            SET status = 'rejected', responded_by_user_id = $1, updated_at = $2
            WHERE event_id = $3 AND status = 'pending'
            ",
        )
        .bind(cleared_by_user_id)
        .bind(Utc::now().to_rfc3339())
        .bind(event_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to clear pending requests: {e}")))?;

        Ok(result.rows_affected())
    }

    async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::storage(format!("Failed to acquire connection: {e}")))
    }
}

/// Convert a database row to a `RescheduleRequest`
fn row_to_request(row: &SqliteRow) -> AppResult<RescheduleRequest> {
    let id: String = row.get("id");
    let event_id: String = row.get("event_id");
    let role: String = row.get("requested_by_role");
    let status: String = row.get("status");
    let from_start: String = row.get("from_start_time");
    let from_end: String = row.get("from_end_time");
    let to_start: String = row.get("to_start_time");
    let to_end: String = row.get("to_end_time");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(RescheduleRequest {
        id: parse_uuid(&id, "meet_reschedule_requests.id")?,
        event_id: parse_uuid(&event_id, "meet_reschedule_requests.event_id")?,
        requested_by_user_id: row.get("requested_by_user_id"),
        requested_by_role: ParticipantRole::parse(&role),
        from_start_time: parse_timestamp(&from_start, "meet_reschedule_requests.from_start_time")?,
        from_end_time: parse_timestamp(&from_end, "meet_reschedule_requests.from_end_time")?,
        to_start_time: parse_timestamp(&to_start, "meet_reschedule_requests.to_start_time")?,
        to_end_time: parse_timestamp(&to_end, "meet_reschedule_requests.to_end_time")?,
        note: row.get("note"),
        status: RescheduleStatus::parse(&status),
        responded_by_user_id: row.get("responded_by_user_id"),
        created_at: parse_timestamp(&created_at, "meet_reschedule_requests.created_at")?,
        updated_at: parse_timestamp(&updated_at, "meet_reschedule_requests.updated_at")?,
    })
}
