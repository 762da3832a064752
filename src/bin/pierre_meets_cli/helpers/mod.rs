// ABOUTME: Argument parsing and JSON output helpers for pierre-meets-cli
// ABOUTME: Keeps command handlers free of formatting details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use pierre_meets::models::{BookingRequestContext, PaidMeetTerms};
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Accept `HH:MM` as well as `HH:MM:SS`
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{raw}': {e}"))
}

/// Paid booking draft from command-line arguments
pub fn paid_context(
    coach: &str,
    day: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
    price_cents: u64,
    currency: String,
    activity_id: Option<String>,
) -> BookingRequestContext {
    BookingRequestContext::paid_meet(
        coach,
        day,
        time,
        PaidMeetTerms {
            activity_id,
            price_cents,
            currency,
            duration_minutes,
        },
    )
}
