// ABOUTME: Booking rule configuration: display offset, paid duration bound and default title
// ABOUTME: Loaded from MEET_* environment variables with validated defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_meets_core::formatters::MeetTimeFormatter;
use serde::{Deserialize, Serialize};

use super::{env_var_or, parse_env_or};
use crate::constants::durations::{DEFAULT_MEET_DURATION_MINUTES, MAX_PAID_MEET_DURATION_MINUTES};
use crate::constants::identifiers::DEFAULT_MEET_TITLE;
use crate::errors::{AppError, AppResult};

/// Rules applied by the booking and reschedule services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Fixed display offset, in minutes east of UTC
    pub display_offset_minutes: i32,
    /// Length of credit-funded meets
    pub credit_meet_duration_minutes: u32,
    /// Longest purchase-defined meet accepted
    pub max_paid_duration_minutes: u32,
    /// Title used when the draft has none
    pub default_title: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            display_offset_minutes: 0,
            credit_meet_duration_minutes: DEFAULT_MEET_DURATION_MINUTES,
            max_paid_duration_minutes: MAX_PAID_MEET_DURATION_MINUTES,
            default_title: DEFAULT_MEET_TITLE.to_owned(),
        }
    }
}

impl BookingConfig {
    /// Load booking configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is unparsable or the offset is out of range
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            display_offset_minutes: parse_env_or("MEET_DISPLAY_OFFSET_MINUTES", 0)?,
            credit_meet_duration_minutes: DEFAULT_MEET_DURATION_MINUTES,
            max_paid_duration_minutes: parse_env_or(
                "MEET_MAX_PAID_DURATION_MINUTES",
                MAX_PAID_MEET_DURATION_MINUTES,
            )?,
            default_title: env_var_or("MEET_DEFAULT_TITLE", DEFAULT_MEET_TITLE),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns an error if the offset or the paid duration bound is unusable
    pub fn validate(&self) -> AppResult<()> {
        self.formatter()?;
        if self.max_paid_duration_minutes == 0 {
            return Err(AppError::config(
                "MEET_MAX_PAID_DURATION_MINUTES must be positive",
            ));
        }
        Ok(())
    }

    /// Display formatter for the configured offset
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside +/- 24 hours
    pub fn formatter(&self) -> AppResult<MeetTimeFormatter> {
        MeetTimeFormatter::from_offset_minutes(self.display_offset_minutes)
    }
}
