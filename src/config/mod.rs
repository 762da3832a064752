// ABOUTME: Configuration management for the meet engine, loaded from environment variables
// ABOUTME: Aggregates database, booking, payment gate and logging settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for Pierre Meets
//!
//! Environment-only configuration: every setting has a documented default and
//! can be overridden with an environment variable. Values that are present but
//! unparsable fail loudly with `ErrorCode::ConfigInvalid` instead of silently
//! falling back.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};
use crate::logging::LoggingConfig;

/// Booking rules (durations, display offset, default title)
pub mod booking;
/// Database connection configuration
pub mod database;
/// External payment gate configuration
pub mod payment;

pub use booking::BookingConfig;
pub use database::{DatabaseConfig, DatabaseUrl};
pub use payment::PaymentConfig;

/// Complete configuration of the meet engine
#[derive(Debug, Clone)]
pub struct MeetsConfig {
    /// Storage settings
    pub database: DatabaseConfig,
    /// Booking rules
    pub booking: BookingConfig,
    /// Payment gate settings
    pub payment: PaymentConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl MeetsConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set to an invalid value
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            booking: BookingConfig::from_env()?,
            payment: PaymentConfig::from_env()?,
            logging: LoggingConfig::from_env(),
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    env::var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}")))
    })
}
