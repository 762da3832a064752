// ABOUTME: HTTP payment gate client posting checkout requests to the payment service
// ABOUTME: Maps transport, status and decoding failures to ExternalServiceError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{PaymentGate, PaymentIntent};
use crate::config::PaymentConfig;
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "payment-gate";

#[derive(Serialize)]
struct PaymentIntentBody<'a> {
    activity_id: &'a str,
}

/// Payment gate reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpPaymentGate {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpPaymentGate {
    /// Create a client for the configured payment gate
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL or the HTTP client cannot be built
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build payment HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.payment_intents_url()?,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PaymentGate for HttpPaymentGate {
    async fn create_payment_intent(&self, activity_id: &str) -> AppResult<PaymentIntent> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&PaymentIntentBody { activity_id });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                SERVICE,
                format!("HTTP {}: {text}", status.as_u16()),
            ));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("Invalid response: {e}")))?;
        debug!(
            payment.activity_id = %activity_id,
            payment.success = intent.success,
            "Payment intent created"
        );
        Ok(intent)
    }
}
