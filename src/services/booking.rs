// ABOUTME: Booking admission control turning a slot draft into a stored meet
// ABOUTME: Credit-funded meets spend one credit in the same transaction that creates the meet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use pierre_meets_core::formatters::MeetTimeFormatter;
use uuid::Uuid;

use super::require_user_id;
use crate::config::BookingConfig;
use crate::database::{CreditLedger, Database, EventStore, TransactionGuard};
use crate::errors::{AppError, AppResult};
use crate::logging::MeetLogger;
use crate::models::{
    BookingConfirmation, BookingRequestContext, CreditBalance, MeetEvent, MeetEventStatus,
    MeetEventType, Participant,
};
use crate::notifications::{dispatch, MeetNotification, NotificationSink};

/// Validated booking draft
struct BookingDraft<'a> {
    requester_id: &'a str,
    coach_id: &'a str,
    day: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
}

/// Creates meets from booking drafts
pub struct BookingService {
    database: Database,
    ledger: CreditLedger,
    notifier: Arc<dyn NotificationSink>,
    config: BookingConfig,
    formatter: MeetTimeFormatter,
}

impl BookingService {
    /// Create a booking service
    ///
    /// # Errors
    ///
    /// Returns an error if the booking configuration is invalid
    pub fn new(
        database: Database,
        notifier: Arc<dyn NotificationSink>,
        config: BookingConfig,
    ) -> AppResult<Self> {
        config.validate()?;
        let formatter = config.formatter()?;
        Ok(Self {
            ledger: CreditLedger::new(database.pool().clone()),
            database,
            notifier,
            config,
            formatter,
        })
    }

    /// Booking rules in effect
    #[must_use]
    pub const fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// Credits a client holds with a coach
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read
    pub async fn credit_balance(&self, client_id: &str, coach_id: &str) -> AppResult<CreditBalance> {
        self.ledger.get_balance(client_id, coach_id).await
    }

    /// Book a meet for `requester_id`
    ///
    /// Paid drafts must already carry `meet_purchase_paid`; credit drafts
    /// spend one credit with the coach. The credit, the meet and the
    /// creator's participant row are written in a single transaction.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` / `InvalidInput` for incomplete drafts
    /// - `PaymentRequired` for a paid draft without confirmed payment
    /// - `InsufficientCredits` when a credit draft finds no credit
    /// - `StorageError` if any write fails; nothing is persisted then
    pub async fn request_booking(
        &self,
        ctx: &BookingRequestContext,
        requester_id: &str,
    ) -> AppResult<BookingConfirmation> {
        let draft = self.validate(ctx, requester_id)?;

        let start_time = self.formatter.to_utc(draft.day, draft.time)?;
        let end_time = start_time + Duration::minutes(i64::from(draft.duration_minutes));

        if ctx.is_paid_meet_flow && !ctx.meet_purchase_paid {
            MeetLogger::log_booking_event(
                draft.requester_id,
                draft.coach_id,
                "payment_check",
                false,
                Some("payment not confirmed"),
            );
            return Err(AppError::payment_required(
                "Paid meet booked before payment was confirmed",
            )
            .with_user_id(draft.requester_id));
        }

        let now = Utc::now();
        let event = MeetEvent {
            id: Uuid::new_v4(),
            coach_id: draft.coach_id.to_owned(),
            created_by_user_id: draft.requester_id.to_owned(),
            title: non_blank(ctx.title.as_deref())
                .unwrap_or(self.config.default_title.as_str())
                .to_owned(),
            description: non_blank(ctx.description.as_deref()).map(str::to_owned),
            start_time,
            end_time,
            event_type: MeetEventType::Consultation,
            status: MeetEventStatus::Scheduled,
            activity_id: if ctx.is_paid_meet_flow {
                ctx.paid_terms
                    .as_ref()
                    .and_then(|terms| terms.activity_id.clone())
            } else {
                None
            },
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let mut guard = TransactionGuard::begin(self.database.pool(), "request_booking").await?;

        let credits_remaining = if ctx.is_paid_meet_flow {
            None
        } else {
            let balance =
                CreditLedger::decrement_in(guard.executor()?, draft.requester_id, draft.coach_id)
                    .await
                    .inspect_err(|e| {
                        MeetLogger::log_booking_event(
                            draft.requester_id,
                            draft.coach_id,
                            "credit_check",
                            false,
                            Some(e.message.as_str()),
                        );
                    })?;
            Some(balance.credits_available)
        };

        EventStore::insert_event(guard.executor()?, &event).await?;
        EventStore::insert_participant(
            guard.executor()?,
            &Participant::creator(event.id, draft.requester_id, now),
        )
        .await?;
        guard.commit().await?;

        if let Some(remaining) = credits_remaining {
            MeetLogger::log_credit_event(draft.requester_id, draft.coach_id, remaining);
        }
        MeetLogger::log_booking_event(
            draft.requester_id,
            draft.coach_id,
            "booked",
            true,
            Some(event.id.to_string().as_str()),
        );

        dispatch(
            self.notifier.as_ref(),
            MeetNotification::BookingConfirmed {
                event_id: event.id,
                coach_id: event.coach_id.clone(),
                client_id: event.created_by_user_id.clone(),
                start_time,
                end_time,
            },
        )
        .await;

        Ok(BookingConfirmation {
            coach_name: non_blank(ctx.coach_display_name.as_deref())
                .unwrap_or(draft.coach_id)
                .to_owned(),
            formatted_date: self.formatter.format_date(start_time),
            formatted_time_range: self.formatter.format_time_range(start_time, end_time),
            duration_minutes: draft.duration_minutes,
            price_cents: ctx
                .paid_terms
                .as_ref()
                .filter(|_| ctx.is_paid_meet_flow)
                .map(|terms| terms.price_cents),
            credits_remaining,
            event,
        })
    }

    /// Check a draft without side effects
    fn validate<'a>(
        &self,
        ctx: &'a BookingRequestContext,
        requester_id: &'a str,
    ) -> AppResult<BookingDraft<'a>> {
        let requester_id = require_user_id(requester_id, "requester_id")?;
        let coach_id = non_blank(ctx.coach_id.as_deref())
            .ok_or_else(|| AppError::missing_field("coach_id"))?;
        let day = ctx.day.ok_or_else(|| AppError::missing_field("day"))?;
        let time = ctx.time.ok_or_else(|| AppError::missing_field("time"))?;

        let duration_minutes = if ctx.is_paid_meet_flow {
            let terms = ctx
                .paid_terms
                .as_ref()
                .ok_or_else(|| AppError::missing_field("paid_terms"))?;
            let max = self.config.max_paid_duration_minutes;
            if terms.duration_minutes == 0 || terms.duration_minutes > max {
                return Err(AppError::invalid_input(format!(
                    "Paid meet duration must be between 1 and {max} minutes, got {}",
                    terms.duration_minutes
                )));
            }
            terms.duration_minutes
        } else {
            self.config.credit_meet_duration_minutes
        };

        Ok(BookingDraft {
            requester_id,
            coach_id,
            day,
            time,
            duration_minutes,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
