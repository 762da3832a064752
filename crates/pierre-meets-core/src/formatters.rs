// ABOUTME: Fixed-offset display formatting for meet dates and time ranges
// ABOUTME: Converts UTC slots to the configured offset for confirmation payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::constants::display::{DATE_FORMAT, TIME_FORMAT};
use crate::errors::{AppError, AppResult};

/// Formats meet slots in one fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetTimeFormatter {
    offset: FixedOffset,
}

impl MeetTimeFormatter {
    /// Formatter for an offset expressed in minutes east of UTC
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside +/- 24 hours
    pub fn from_offset_minutes(minutes: i32) -> AppResult<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::config(format!("Display offset out of range: {minutes} minutes"))
            })?;
        Ok(Self { offset })
    }

    /// Formatter for UTC
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// The display offset
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Interpret a wall-clock day and time in the display offset
    ///
    /// # Errors
    ///
    /// Returns an error if the local time cannot be mapped to an instant
    pub fn to_utc(&self, day: NaiveDate, time: NaiveTime) -> AppResult<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| AppError::invalid_input(format!("Ambiguous local time {day} {time}")))
    }

    /// Long date of an instant, e.g. "Monday, March 3, 2025"
    #[must_use]
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(DATE_FORMAT).to_string()
    }

    /// Time range of a slot, e.g. "10:00 AM - 10:30 AM"
    #[must_use]
    pub fn format_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{} - {}",
            start.with_timezone(&self.offset).format(TIME_FORMAT),
            end.with_timezone(&self.offset).format(TIME_FORMAT)
        )
    }
}

impl Default for MeetTimeFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_in_utc() {
        let formatter = MeetTimeFormatter::utc();
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        let end = start + Duration::minutes(30);

        assert_eq!(formatter.format_date(start), "Monday, March 3, 2025");
        assert_eq!(formatter.format_time_range(start, end), "10:00 AM - 10:30 AM");
    }

    #[test]
    fn test_local_time_maps_through_offset() {
        let formatter = MeetTimeFormatter::from_offset_minutes(120).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let start = formatter.to_utc(day, time).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 3, 7, 0, 0).unwrap());
        assert_eq!(
            formatter.format_time_range(start, start + Duration::minutes(60)),
            "9:00 AM - 10:00 AM"
        );
    }

    #[test]
    fn test_offset_out_of_range() {
        assert!(MeetTimeFormatter::from_offset_minutes(25 * 60).is_err());
    }
}
