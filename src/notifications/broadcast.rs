// ABOUTME: Broadcast channel notification sink for in-process subscribers
// ABOUTME: Delivery adapters (SSE, push, email) subscribe and forward meet notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{MeetNotification, NotificationSink};
use crate::errors::{AppError, AppResult};

/// Default capacity of the notification channel
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out sink backed by a `tokio` broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastNotificationSink {
    sender: broadcast::Sender<MeetNotification>,
}

impl Default for BroadcastNotificationSink {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastNotificationSink {
    /// Create a sink buffering up to `capacity` notifications per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new subscriber
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MeetNotification> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotificationSink {
    async fn notify(&self, notification: &MeetNotification) -> AppResult<()> {
        let delivered = self.sender.send(notification.clone()).map_err(|_| {
            AppError::internal(format!(
                "No subscribers for {} notification",
                notification.kind()
            ))
        })?;
        debug!(
            notification.kind = notification.kind(),
            subscribers = delivered,
            "Notification broadcast"
        );
        Ok(())
    }
}
