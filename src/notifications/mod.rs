// ABOUTME: Meet notifications emitted after bookings, reschedules and cancellations commit
// ABOUTME: Sinks are fire-and-forget; a delivery failure is logged and never fails the operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Notification dispatch
//!
//! Services build a [`MeetNotification`] once their transaction has committed
//! and hand it to [`dispatch`]. Delivery itself (push, email, SSE) belongs to
//! whoever implements [`NotificationSink`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::logging::MeetLogger;
use crate::models::RescheduleStatus;

/// In-process broadcast fan-out
pub mod broadcast;

pub use broadcast::BroadcastNotificationSink;

/// Domain events delivered to the notification layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeetNotification {
    /// A meet was booked
    BookingConfirmed {
        /// Booked meet
        event_id: Uuid,
        /// Coach being met
        coach_id: String,
        /// Client who booked
        client_id: String,
        /// Slot start
        start_time: DateTime<Utc>,
        /// Slot end
        end_time: DateTime<Utc>,
    },
    /// A reschedule now waits for the counterparty
    RescheduleRequested {
        /// Stored request
        request_id: Uuid,
        /// Meet to move
        event_id: Uuid,
        /// Proposer
        requested_by_user_id: String,
        /// Proposed start
        to_start_time: DateTime<Utc>,
        /// Proposed end
        to_end_time: DateTime<Utc>,
    },
    /// A meet moved without negotiation
    RescheduleApplied {
        /// Moved meet
        event_id: Uuid,
        /// User who moved it
        applied_by_user_id: String,
        /// New start
        start_time: DateTime<Utc>,
        /// New end
        end_time: DateTime<Utc>,
    },
    /// The counterparty answered a reschedule request
    RescheduleResolved {
        /// Answered request
        request_id: Uuid,
        /// Meet concerned
        event_id: Uuid,
        /// Approved or rejected
        status: RescheduleStatus,
        /// Counterparty
        responded_by_user_id: String,
    },
    /// A meet was called off
    MeetCancelled {
        /// Cancelled meet
        event_id: Uuid,
        /// User who cancelled
        cancelled_by_user_id: String,
    },
}

impl MeetNotification {
    /// Stable name of the notification kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::RescheduleRequested { .. } => "reschedule_requested",
            Self::RescheduleApplied { .. } => "reschedule_applied",
            Self::RescheduleResolved { .. } => "reschedule_resolved",
            Self::MeetCancelled { .. } => "meet_cancelled",
        }
    }

    /// Meet the notification is about
    #[must_use]
    pub const fn event_id(&self) -> Uuid {
        match self {
            Self::BookingConfirmed { event_id, .. }
            | Self::RescheduleRequested { event_id, .. }
            | Self::RescheduleApplied { event_id, .. }
            | Self::RescheduleResolved { event_id, .. }
            | Self::MeetCancelled { event_id, .. } => *event_id,
        }
    }
}

/// Receiver of meet notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off
    async fn notify(&self, notification: &MeetNotification) -> AppResult<()>;
}

/// Sink that only writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, notification: &MeetNotification) -> AppResult<()> {
        info!(
            notification.kind = notification.kind(),
            notification.event_id = %notification.event_id(),
            "Meet notification"
        );
        Ok(())
    }
}

/// Hand a notification to a sink, logging instead of propagating failures
pub async fn dispatch(sink: &dyn NotificationSink, notification: MeetNotification) {
    if let Err(e) = sink.notify(&notification).await {
        MeetLogger::log_notification_failure(notification.kind(), &e);
    }
}
