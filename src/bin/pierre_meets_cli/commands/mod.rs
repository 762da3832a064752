// ABOUTME: Command handlers for pierre-meets-cli
// ABOUTME: Each handler calls one service operation and prints its result as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pierre_meets::config::{DatabaseUrl, MeetsConfig};
use pierre_meets::database::Database;
use pierre_meets::models::{BookingRequestContext, PaidMeetTerms};
use pierre_meets::notifications::{LogNotificationSink, NotificationSink};
use pierre_meets::payments::{start_meet_checkout, HttpPaymentGate};
use pierre_meets::services::{AttendanceService, BookingService, RescheduleService};
use tracing::info;
use uuid::Uuid;

use crate::helpers::print_json;

/// Services wired to one database
pub struct Services {
    database: Database,
    booking: BookingService,
    reschedule: RescheduleService,
    attendance: AttendanceService,
}

impl Services {
    pub async fn connect(config: &MeetsConfig) -> Result<Self> {
        if let DatabaseUrl::SQLite { path } = &config.database.url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        info!("Connecting to database: {}", config.database.url);
        let database = Database::new(&config.database).await?;
        let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);

        Ok(Self {
            booking: BookingService::new(
                database.clone(),
                Arc::clone(&notifier),
                config.booking.clone(),
            )?,
            reschedule: RescheduleService::new(database.clone(), Arc::clone(&notifier)),
            attendance: AttendanceService::new(database.clone(), notifier),
            database,
        })
    }
}

pub async fn migrate(services: &Services) -> Result<()> {
    services.database.migrate().await?;
    print_json(&serde_json::json!({ "migrated": true }))
}

pub async fn balance(services: &Services, client: &str, coach: &str) -> Result<()> {
    let balance = services.booking.credit_balance(client, coach).await?;
    print_json(&balance)
}

pub async fn book(
    services: &Services,
    context: &BookingRequestContext,
    client: &str,
) -> Result<()> {
    let confirmation = services.booking.request_booking(context, client).await?;
    print_json(&confirmation)
}

pub async fn checkout(config: &MeetsConfig, activity_id: String) -> Result<()> {
    let gate = HttpPaymentGate::new(&config.payment)?;
    let context = BookingRequestContext {
        is_paid_meet_flow: true,
        paid_terms: Some(PaidMeetTerms {
            activity_id: Some(activity_id),
            price_cents: 0,
            currency: String::new(),
            duration_minutes: 0,
        }),
        ..BookingRequestContext::default()
    };
    let intent = start_meet_checkout(&gate, &context).await?;
    print_json(&intent)
}

pub async fn respond(services: &Services, meet: Uuid, user: &str, accept: bool) -> Result<()> {
    let participant = services
        .attendance
        .respond_to_invitation(meet, user, accept)
        .await?;
    print_json(&participant)
}

pub async fn reschedule(
    services: &Services,
    meet: Uuid,
    user: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    note: Option<&str>,
) -> Result<()> {
    let preview = RescheduleService::preview_reschedule(meet, start, end, user, note)?;
    let outcome = services
        .reschedule
        .commit_reschedule(meet, &preview, user)
        .await?;
    print_json(&outcome)
}

pub async fn requests(services: &Services, user: &str) -> Result<()> {
    let pending = services.reschedule.list_pending_reschedules(user).await?;
    print_json(&pending)
}

pub async fn approve(services: &Services, request: Uuid, user: &str) -> Result<()> {
    let event = services.reschedule.approve_reschedule(request, user).await?;
    print_json(&event)
}

pub async fn reject(services: &Services, request: Uuid, user: &str) -> Result<()> {
    let request = services.reschedule.reject_reschedule(request, user).await?;
    print_json(&request)
}

pub async fn cancel(services: &Services, meet: Uuid, user: &str) -> Result<()> {
    let event = services.attendance.cancel_meet(meet, user).await?;
    print_json(&event)
}

pub async fn complete(services: &Services, meet: Uuid, user: &str) -> Result<()> {
    let event = services.attendance.complete_meet(meet, user).await?;
    print_json(&event)
}

pub async fn meets(services: &Services, user: &str) -> Result<()> {
    let events = services.attendance.list_meets_for_user(user).await?;
    print_json(&events)
}
