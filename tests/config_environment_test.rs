// ABOUTME: Tests for environment-driven configuration loading
// ABOUTME: Defaults, overrides and loud failures on unparsable values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use pierre_meets::config::{BookingConfig, DatabaseConfig, DatabaseUrl, MeetsConfig, PaymentConfig};
use pierre_meets::errors::ErrorCode;
use pierre_meets::logging::{LogFormat, LoggingConfig};
use serial_test::serial;

const MEET_VARS: &[&str] = &[
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "AUTO_MIGRATE",
    "MEET_DISPLAY_OFFSET_MINUTES",
    "MEET_MAX_PAID_DURATION_MINUTES",
    "MEET_DEFAULT_TITLE",
    "PAYMENT_GATE_URL",
    "PAYMENT_GATE_API_KEY",
    "PAYMENT_GATE_TIMEOUT_SECS",
    "LOG_FORMAT",
];

fn clear_meet_vars() {
    for key in MEET_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_meet_vars();

    let config = MeetsConfig::from_env().unwrap();

    assert_eq!(
        config.database.url,
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/meets.db")
        }
    );
    assert!(config.database.auto_migrate);
    assert_eq!(config.booking, BookingConfig::default());
    assert_eq!(config.booking.credit_meet_duration_minutes, 30);
    assert_eq!(config.booking.max_paid_duration_minutes, 240);
    assert_eq!(config.payment.api_key, None);
    assert_eq!(
        config.payment.payment_intents_url().unwrap().as_str(),
        "http://localhost:8090/api/payment-intents"
    );
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_meet_vars();
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("MEET_DISPLAY_OFFSET_MINUTES", "-300");
    env::set_var("MEET_DEFAULT_TITLE", "Check-in");
    env::set_var("PAYMENT_GATE_URL", "https://pay.example.com/v1");
    env::set_var("PAYMENT_GATE_API_KEY", "secret-key");

    let config = MeetsConfig::from_env().unwrap();
    clear_meet_vars();

    assert!(config.database.url.is_memory());
    assert_eq!(config.booking.display_offset_minutes, -300);
    assert_eq!(config.booking.default_title, "Check-in");
    assert_eq!(
        config.payment.payment_intents_url().unwrap().as_str(),
        "https://pay.example.com/v1/payment-intents"
    );
    assert!(!format!("{:?}", config.payment).contains("secret-key"));
}

#[test]
#[serial]
fn test_unparsable_values_fail_loudly() {
    clear_meet_vars();

    env::set_var("MEET_DISPLAY_OFFSET_MINUTES", "east");
    let err = BookingConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    env::set_var("MEET_DISPLAY_OFFSET_MINUTES", "100000");
    let err = BookingConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    env::set_var("MEET_DISPLAY_OFFSET_MINUTES", "0");
    env::set_var("MEET_MAX_PAID_DURATION_MINUTES", "0");
    let err = BookingConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    env::set_var("DATABASE_MAX_CONNECTIONS", "many");
    let err = DatabaseConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    env::set_var("PAYMENT_GATE_URL", "not a url");
    let err = PaymentConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);

    clear_meet_vars();
}

#[test]
#[serial]
fn test_log_format_selection() {
    clear_meet_vars();
    assert_eq!(LoggingConfig::from_env().format, LogFormat::Pretty);

    env::set_var("LOG_FORMAT", "json");
    assert_eq!(LoggingConfig::from_env().format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "compact");
    assert_eq!(LoggingConfig::from_env().format, LogFormat::Compact);

    clear_meet_vars();
}
