// ABOUTME: Logging configuration and structured logging setup for the meet engine
// ABOUTME: Configures log levels, output formats, and domain events for bookings and reschedules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Production-ready logging configuration with structured output

use std::env;
use std::io;

use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for CLI usage
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            service_name: service_names::PIERRE_MEETS.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::PIERRE_MEETS.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Build the filter: `RUST_LOG` (or the configured level) plus noise reduction
    fn env_filter(&self) -> EnvFilter {
        let base = env::var("RUST_LOG").unwrap_or_else(|_| self.level.clone());
        ["sqlx=warn", "reqwest=warn", "hyper=warn"]
            .iter()
            .filter_map(|directive| directive.parse().ok())
            .fold(EnvFilter::new(base), EnvFilter::add_directive)
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> AppResult<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        let result = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stdout)
                        .with_span_events(FmtSpan::NONE)
                        .json(),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_file(self.include_location)
                        .with_line_number(self.include_location)
                        .with_thread_ids(self.include_thread)
                        .with_target(true)
                        .with_writer(io::stdout),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(io::stderr),
                )
                .try_init(),
        };
        result.map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))?;

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Pierre Meets starting up"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> AppResult<()> {
    LoggingConfig::from_env().init()
}

/// Structured domain events for the meet engine
pub struct MeetLogger;

impl MeetLogger {
    /// Log a booking admission decision
    pub fn log_booking_event(
        requester_id: &str,
        coach_id: &str,
        event: &str,
        success: bool,
        details: Option<&str>,
    ) {
        if success {
            info!(
                user.id = %requester_id,
                booking.coach_id = %coach_id,
                booking.event = %event,
                booking.success = true,
                booking.details = details.unwrap_or(""),
                "Booking event"
            );
        } else {
            warn!(
                user.id = %requester_id,
                booking.coach_id = %coach_id,
                booking.event = %event,
                booking.success = false,
                booking.details = details.unwrap_or(""),
                "Booking event"
            );
        }
    }

    /// Log a reschedule negotiation step
    pub fn log_reschedule_event(user_id: &str, meet_id: &str, event: &str, outcome: &str) {
        info!(
            user.id = %user_id,
            reschedule.meet_id = %meet_id,
            reschedule.event = %event,
            reschedule.outcome = %outcome,
            "Reschedule event"
        );
    }

    /// Log a credit ledger movement
    pub fn log_credit_event(client_id: &str, coach_id: &str, remaining: u32) {
        info!(
            credits.client_id = %client_id,
            credits.coach_id = %coach_id,
            credits.remaining = remaining,
            "Meet credit spent"
        );
    }

    /// Log an attendance change (RSVP, cancellation, completion)
    pub fn log_attendance_event(user_id: &str, meet_id: &str, event: &str) {
        info!(
            user.id = %user_id,
            attendance.meet_id = %meet_id,
            attendance.event = %event,
            "Attendance event"
        );
    }

    /// Log a payment gate call
    pub fn log_payment_event(activity_id: &str, success: bool, intent_id: Option<&str>) {
        info!(
            payment.activity_id = %activity_id,
            payment.success = success,
            payment.intent_id = intent_id.unwrap_or(""),
            "Payment intent"
        );
    }

    /// Log a notification that could not be delivered
    pub fn log_notification_failure(kind: &str, error: &AppError) {
        warn!(
            notification.kind = %kind,
            error = %error,
            "Notification delivery failed, operation result unaffected"
        );
    }
}
