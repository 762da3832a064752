// ABOUTME: Shared test utilities and setup functions for meet integration tests
// ABOUTME: Provides databases, credit seeding, booking helpers and recording notification sinks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    missing_docs,
    clippy::unwrap_used,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `pierre_meets`

use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use pierre_meets::config::{BookingConfig, DatabaseConfig};
use pierre_meets::database::Database;
use pierre_meets::errors::{AppError, AppResult};
use pierre_meets::models::{BookingRequestContext, MeetEvent, PaidMeetTerms};
use pierre_meets::notifications::{MeetNotification, NotificationSink};
use pierre_meets::services::{AttendanceService, BookingService, RescheduleService};
use tempfile::TempDir;

pub const CLIENT: &str = "client-a";
pub const COACH: &str = "coach-b";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database with the meet schema
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new(&DatabaseConfig::in_memory()).await?)
}

/// File-backed database with a multi-connection pool, for contention tests
pub async fn create_file_database(dir: &TempDir) -> Result<Database> {
    init_test_logging();
    let mut config = DatabaseConfig::file(dir.path().join("meets.db"));
    config.max_connections = 8;
    Ok(Database::new(&config).await?)
}

/// Grant credits the way the external purchase flow would
pub async fn seed_credits(database: &Database, client_id: &str, coach_id: &str, credits: i64) {
    sqlx::query(
        r"
        INSERT INTO client_meet_credits (client_id, coach_id, credits_available, updated_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (client_id, coach_id) DO UPDATE SET credits_available = excluded.credits_available
        ",
    )
    .bind(client_id)
    .bind(coach_id)
    .bind(credits)
    .bind(Utc::now().to_rfc3339())
    .execute(database.pool())
    .await
    .unwrap();
}

pub async fn count_rows(database: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(database.pool())
        .await
        .unwrap()
}

pub fn meet_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

pub fn meet_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap()
}

pub fn credit_context() -> BookingRequestContext {
    let mut ctx = BookingRequestContext::credit_meet(COACH, meet_day(), meet_time());
    ctx.coach_display_name = Some("Coach Bea".to_owned());
    ctx
}

pub fn paid_context(paid: bool) -> BookingRequestContext {
    let mut ctx = BookingRequestContext::paid_meet(
        COACH,
        meet_day(),
        meet_time(),
        PaidMeetTerms {
            activity_id: Some("activity-42".to_owned()),
            price_cents: 4_500,
            currency: "USD".to_owned(),
            duration_minutes: 60,
        },
    );
    ctx.meet_purchase_paid = paid;
    ctx
}

/// All three services sharing one database and one sink
pub struct TestServices {
    pub database: Database,
    pub sink: Arc<RecordingSink>,
    pub booking: BookingService,
    pub reschedule: RescheduleService,
    pub attendance: AttendanceService,
}

impl TestServices {
    pub fn new(database: Database) -> Self {
        let sink = Arc::new(RecordingSink::default());
        Self::with_sink(database, sink.clone(), sink)
    }

    pub fn with_sink(
        database: Database,
        sink: Arc<RecordingSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            booking: BookingService::new(
                database.clone(),
                notifier.clone(),
                BookingConfig::default(),
            )
            .unwrap(),
            reschedule: RescheduleService::new(database.clone(), notifier.clone()),
            attendance: AttendanceService::new(database.clone(), notifier),
            sink,
            database,
        }
    }

    /// Book one credit-funded meet for `CLIENT` with `COACH`
    pub async fn book_meet(&self) -> MeetEvent {
        seed_credits(&self.database, CLIENT, COACH, 1).await;
        self.booking
            .request_booking(&credit_context(), CLIENT)
            .await
            .unwrap()
            .event
    }
}

pub async fn setup() -> Result<TestServices> {
    Ok(TestServices::new(create_test_database().await?))
}

/// Sink that remembers every notification it receives
#[derive(Default)]
pub struct RecordingSink {
    received: Mutex<Vec<MeetNotification>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<MeetNotification> {
        self.received.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.received().iter().map(MeetNotification::kind).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: &MeetNotification) -> AppResult<()> {
        self.received.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Sink whose delivery always fails
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn notify(&self, _notification: &MeetNotification) -> AppResult<()> {
        Err(AppError::internal("notification transport down"))
    }
}
