// ABOUTME: SQLite storage for meets, participants, reschedule requests and meet credits
// ABOUTME: Owns the connection pool, schema migrations and shared row-mapping helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Four tables back the meet engine: `meet_events`, `meet_event_participants`,
//! `meet_reschedule_requests` and `client_meet_credits`. Store types take a
//! `&mut SqliteConnection` for every write so services can compose them inside
//! one `TransactionGuard`.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, AppResult};

/// Meet credit ledger
pub mod credits;
/// Meet events and their participants
pub mod events;
/// Reschedule request storage
pub mod reschedules;
/// RAII transaction guard
pub mod transactions;

pub use credits::CreditLedger;
pub use events::EventStore;
pub use reschedules::RescheduleStore;
pub use transactions::TransactionGuard;

/// Database manager for meet storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and by default migrate) the configured database
    ///
    /// In-memory databases live inside a single connection, so their pool is
    /// pinned to exactly one connection that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the migrations fail
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        let url = config.url.to_connection_string();
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| AppError::config(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool = if config.url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections.max(1))
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await
        }
        .map_err(|e| AppError::storage(format!("Failed to connect to {url}: {e}")))?;

        info!(database.url = %config.url, "Meet database connected");

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all meet tables and indexes
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::storage(format!("Migration failed: {e}")))?;
        }
        debug!("Meet schema migrated");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS meet_events (
        id TEXT PRIMARY KEY,
        coach_id TEXT NOT NULL,
        created_by_user_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        event_type TEXT NOT NULL DEFAULT 'consultation' CHECK (event_type = 'consultation'),
        status TEXT NOT NULL DEFAULT 'scheduled'
            CHECK (status IN ('scheduled', 'cancelled', 'completed')),
        activity_id TEXT,
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meet_events_coach ON meet_events(coach_id)",
    "CREATE INDEX IF NOT EXISTS idx_meet_events_creator ON meet_events(created_by_user_id)",
    r"
    CREATE TABLE IF NOT EXISTS meet_event_participants (
        event_id TEXT NOT NULL REFERENCES meet_events(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        rsvp_status TEXT NOT NULL DEFAULT 'pending'
            CHECK (rsvp_status IN ('pending', 'accepted', 'declined')),
        invited_by_user_id TEXT NOT NULL,
        invited_by_role TEXT NOT NULL CHECK (invited_by_role IN ('client', 'coach')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (event_id, user_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_meet_participants_user ON meet_event_participants(user_id)",
    r"
    CREATE TABLE IF NOT EXISTS meet_reschedule_requests (
        id TEXT PRIMARY KEY,
        event_id TEXT NOT NULL REFERENCES meet_events(id) ON DELETE CASCADE,
        requested_by_user_id TEXT NOT NULL,
        requested_by_role TEXT NOT NULL CHECK (requested_by_role IN ('client', 'coach')),
        from_start_time TEXT NOT NULL,
        from_end_time TEXT NOT NULL,
        to_start_time TEXT NOT NULL,
        to_end_time TEXT NOT NULL,
        note TEXT,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'approved', 'rejected')),
        responded_by_user_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    // At most one open negotiation per meet
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_meet_reschedule_one_pending
        ON meet_reschedule_requests(event_id) WHERE status = 'pending'
    ",
    r"
    CREATE TABLE IF NOT EXISTS client_meet_credits (
        client_id TEXT NOT NULL,
        coach_id TEXT NOT NULL,
        credits_available INTEGER NOT NULL DEFAULT 0 CHECK (credits_available >= 0),
        updated_at TEXT NOT NULL,
        PRIMARY KEY (client_id, coach_id)
    )
    ",
];

/// Parse an RFC 3339 column value
pub(crate) fn parse_timestamp(value: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime in {column}: {e}")))
}

/// Parse a UUID column value
pub(crate) fn parse_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::internal(format!("Invalid UUID in {column}: {e}")))
}
