// ABOUTME: Payment gate configuration for the paid meet checkout flow
// ABOUTME: Endpoint, credentials and request timeout of the external checkout service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt;

use url::Url;

use super::{env_var_or, parse_env_or};
use crate::errors::{AppError, AppResult};

/// Default payment gate base URL for local development
const DEFAULT_PAYMENT_GATE_URL: &str = "http://localhost:8090/api";

/// Default request timeout for payment gate calls
const DEFAULT_PAYMENT_TIMEOUT_SECS: u64 = 10;

/// External payment gate settings
#[derive(Clone)]
pub struct PaymentConfig {
    /// Base URL of the checkout service
    pub base_url: Url,
    /// Bearer token sent with every call
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

// Hand-written so the API key never lands in logs
impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PaymentConfig {
    /// Build a configuration for an explicit base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse
    pub fn new(base_url: &str) -> AppResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            api_key: None,
            timeout_secs: DEFAULT_PAYMENT_TIMEOUT_SECS,
        })
    }

    /// Load payment gate configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or timeout is invalid
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            base_url: parse_base_url(&env_var_or("PAYMENT_GATE_URL", DEFAULT_PAYMENT_GATE_URL))?,
            api_key: env::var("PAYMENT_GATE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout_secs: parse_env_or("PAYMENT_GATE_TIMEOUT_SECS", DEFAULT_PAYMENT_TIMEOUT_SECS)?,
        })
    }

    /// Endpoint creating payment intents
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be joined onto the base URL
    pub fn payment_intents_url(&self) -> AppResult<Url> {
        self.base_url
            .join("payment-intents")
            .map_err(|e| AppError::config(format!("Invalid payment gate URL: {e}")))
    }
}

// Trailing slash keeps Url::join appending instead of replacing the last segment
fn parse_base_url(raw: &str) -> AppResult<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| AppError::config(format!("Invalid PAYMENT_GATE_URL '{raw}': {e}")))
}
