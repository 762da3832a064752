// ABOUTME: Payment gate boundary for the paid meet flow
// ABOUTME: Creates checkout intents; payment verification stays with the payment provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Payment gate
//!
//! The paid flow runs in two steps. The caller first starts a checkout with
//! [`start_meet_checkout`], sends the user to the returned URL, and later
//! retries the booking with `meet_purchase_paid` set once the provider has
//! confirmed payment. Booking never calls the gate itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::logging::MeetLogger;
use crate::models::BookingRequestContext;

/// `reqwest` implementation of the gate
pub mod http;

pub use http::HttpPaymentGate;

/// Checkout intent returned by the payment gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Whether the gate accepted the request
    pub success: bool,
    /// Where to send the user to pay
    #[serde(default)]
    pub checkout_url: Option<String>,
    /// Provider-side intent identifier
    #[serde(default)]
    pub intent_id: Option<String>,
}

/// External checkout service
#[async_trait]
pub trait PaymentGate: Send + Sync {
    /// Create a checkout intent for a purchasable activity
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` if the gate cannot be reached or answers badly
    async fn create_payment_intent(&self, activity_id: &str) -> AppResult<PaymentIntent>;
}

/// Start checkout for a paid meet draft
///
/// # Errors
///
/// Returns `InvalidInput` if the draft is not a paid flow with an activity,
/// or `ExternalServiceError` if the gate fails or declines the request
pub async fn start_meet_checkout(
    gate: &dyn PaymentGate,
    ctx: &BookingRequestContext,
) -> AppResult<PaymentIntent> {
    if !ctx.is_paid_meet_flow {
        return Err(AppError::invalid_input(
            "Checkout is only available for paid meets",
        ));
    }
    let activity_id = ctx
        .paid_terms
        .as_ref()
        .and_then(|terms| terms.activity_id.as_deref())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::missing_field("activity_id"))?;

    let intent = gate.create_payment_intent(activity_id).await?;
    MeetLogger::log_payment_event(activity_id, intent.success, intent.intent_id.as_deref());

    if !intent.success {
        return Err(AppError::external_service(
            "payment-gate",
            format!("Checkout declined for activity {activity_id}"),
        ));
    }
    Ok(intent)
}
