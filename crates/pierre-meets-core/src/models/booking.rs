// ABOUTME: Transient booking input and confirmation payload exchanged with the UI layer
// ABOUTME: Carries slot draft, paid-flow terms and the externally verified payment flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::meet::MeetEvent;

/// Price and duration of a purchased meet, resolved outside the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidMeetTerms {
    /// Purchased product the meet is linked to
    pub activity_id: Option<String>,
    /// Price in minor currency units
    pub price_cents: u64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Negotiated meet length
    pub duration_minutes: u32,
}

/// Everything the UI knows about the slot the user wants to book
///
/// Required fields are optional here on purpose: the booking service is the
/// single place that decides whether a draft is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequestContext {
    /// Coach to book
    pub coach_id: Option<String>,
    /// Coach name for the confirmation screen
    pub coach_display_name: Option<String>,
    /// Day of the meet in the display offset
    pub day: Option<NaiveDate>,
    /// Start time of the meet in the display offset
    pub time: Option<NaiveTime>,
    /// Title draft
    pub title: Option<String>,
    /// Description draft
    pub description: Option<String>,
    /// Whether this booking is paid instead of credit-funded
    pub is_paid_meet_flow: bool,
    /// Paid-flow terms; required when `is_paid_meet_flow` is set
    pub paid_terms: Option<PaidMeetTerms>,
    /// Payment confirmation signal, trusted as already verified
    pub meet_purchase_paid: bool,
}

impl BookingRequestContext {
    /// Credit-funded draft for a coach slot
    #[must_use]
    pub fn credit_meet(coach_id: &str, day: NaiveDate, time: NaiveTime) -> Self {
        Self {
            coach_id: Some(coach_id.to_owned()),
            day: Some(day),
            time: Some(time),
            ..Self::default()
        }
    }

    /// Paid draft for a coach slot; payment is not yet confirmed
    #[must_use]
    pub fn paid_meet(coach_id: &str, day: NaiveDate, time: NaiveTime, terms: PaidMeetTerms) -> Self {
        Self {
            is_paid_meet_flow: true,
            paid_terms: Some(terms),
            ..Self::credit_meet(coach_id, day, time)
        }
    }
}

/// Payload returned to the caller after a successful booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Stored meet
    pub event: MeetEvent,
    /// Coach name to display
    pub coach_name: String,
    /// Long date in the display offset
    pub formatted_date: String,
    /// "start - end" in the display offset
    pub formatted_time_range: String,
    /// Meet length
    pub duration_minutes: u32,
    /// Price for paid meets
    pub price_cents: Option<u64>,
    /// Credits left with the coach after a credit-funded booking
    pub credits_remaining: Option<u32>,
}
