// ABOUTME: Tests for notification sinks and their wire shape
// ABOUTME: Broadcast fan-out to subscribers and tagged JSON payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files: allow missing_docs (rustc lint) and unwrap (valid in tests)
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{create_test_database, credit_context, seed_credits, CLIENT, COACH};
use pierre_meets::config::BookingConfig;
use pierre_meets::notifications::{BroadcastNotificationSink, MeetNotification, NotificationSink};
use pierre_meets::services::BookingService;
use uuid::Uuid;

fn cancelled(event_id: Uuid) -> MeetNotification {
    MeetNotification::MeetCancelled {
        event_id,
        cancelled_by_user_id: CLIENT.to_owned(),
    }
}

#[tokio::test]
async fn test_broadcast_reaches_every_subscriber() -> Result<()> {
    let sink = BroadcastNotificationSink::default();
    let mut first = sink.subscribe();
    let mut second = sink.subscribe();
    assert_eq!(sink.subscriber_count(), 2);

    let notification = cancelled(Uuid::new_v4());
    sink.notify(&notification).await?;

    assert_eq!(first.recv().await?, notification);
    assert_eq!(second.recv().await?, notification);
    Ok(())
}

#[tokio::test]
async fn test_broadcast_without_subscribers_reports_failure() {
    let sink = BroadcastNotificationSink::new(4);

    assert!(sink.notify(&cancelled(Uuid::new_v4())).await.is_err());
}

#[tokio::test]
async fn test_booking_publishes_to_subscribers() -> Result<()> {
    let database = create_test_database().await?;
    seed_credits(&database, CLIENT, COACH, 1).await;
    let sink = Arc::new(BroadcastNotificationSink::default());
    let mut receiver = sink.subscribe();
    let booking = BookingService::new(database, sink, BookingConfig::default())?;

    let confirmation = booking.request_booking(&credit_context(), CLIENT).await?;

    let received = receiver.recv().await?;
    assert_eq!(received.kind(), "booking_confirmed");
    assert_eq!(received.event_id(), confirmation.event.id);
    Ok(())
}

#[test]
fn test_notifications_serialize_with_type_tag() -> Result<()> {
    let event_id = Uuid::new_v4();
    let value = serde_json::to_value(cancelled(event_id))?;

    assert_eq!(value["type"], "meet_cancelled");
    assert_eq!(value["event_id"], event_id.to_string());
    assert_eq!(value["cancelled_by_user_id"], CLIENT);
    Ok(())
}
