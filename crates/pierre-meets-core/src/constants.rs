// ABOUTME: Application constants for meet scheduling organized by concern
// ABOUTME: Durations, limits, event type identifiers and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Meet duration and window limits
pub mod durations {
    /// Duration of a credit-funded meet, in minutes
    pub const DEFAULT_MEET_DURATION_MINUTES: u32 = 30;

    /// Upper bound for a purchase-defined meet duration, in minutes
    pub const MAX_PAID_MEET_DURATION_MINUTES: u32 = 240;
}

/// Stable identifiers stored alongside meets
pub mod identifiers {
    /// Event type for every meet created by the booking engine
    pub const CONSULTATION_EVENT_TYPE: &str = "consultation";

    /// Title used when the booking draft leaves it empty
    pub const DEFAULT_MEET_TITLE: &str = "1:1 Meet";
}

/// Service names used in structured logs
pub mod service_names {
    /// Meet engine service name
    pub const PIERRE_MEETS: &str = "pierre-meets";
}

/// Display formats for confirmation payloads
pub mod display {
    /// Long date, e.g. "Monday, March 3, 2025"
    pub const DATE_FORMAT: &str = "%A, %B %-d, %Y";

    /// Twelve-hour clock time, e.g. "9:30 AM"
    pub const TIME_FORMAT: &str = "%-I:%M %p";
}
