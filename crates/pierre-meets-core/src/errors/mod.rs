// ABOUTME: Unified error handling for the meet booking, credit and reschedule engine
// ABOUTME: Defines AppError, ErrorCode, user-facing messages and storage error conversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every operation of the meet engine returns `AppResult<T>`. The error code
//! is the contract with the UI layer: each admission or authorization failure
//! has its own code and its own user-facing message, because the user has to
//! do something different for each one (buy credits, pay, wait for the
//! counterparty, pick another slot).

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;

/// Standard error codes used throughout the meet engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authorization (1000-1999)
    /// Caller has no standing on the event or request
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,

    // Admission control (2000-2999)
    /// No meet credit left for this client/coach pair
    #[serde(rename = "INSUFFICIENT_CREDITS")]
    InsufficientCredits = 2100,
    /// Paid-flow booking attempted before payment was confirmed
    #[serde(rename = "PAYMENT_REQUIRED")]
    PaymentRequired = 2101,

    // Validation (3000-3999)
    /// The provided input is invalid
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field is missing
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,

    // Resource Management (4000-4999)
    /// Event or reschedule request does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// A negotiated reschedule already awaits approval
    #[serde(rename = "ALREADY_PENDING")]
    AlreadyPending = 4005,
    /// Resource is in a state that does not allow the operation
    #[serde(rename = "INVALID_STATE")]
    InvalidState = 4006,
    /// Optimistic version check lost against a concurrent writer
    #[serde(rename = "CONCURRENT_MODIFICATION")]
    ConcurrentModification = 4007,

    // External Services (5000-5999)
    /// Payment gate or another collaborator failed
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,

    // Configuration (6000-6999)
    /// Configuration is invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Persistence failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the HTTP status code a UI backend should answer with
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::MissingRequiredField => 400,
            Self::PaymentRequired => 402,
            Self::PermissionDenied => 403,
            Self::ResourceNotFound => 404,
            Self::AlreadyPending | Self::InvalidState | Self::ConcurrentModification => 409,
            Self::InsufficientCredits => 422,
            Self::ExternalServiceError => 502,
            Self::InternalError | Self::StorageError | Self::ConfigInvalid => 500,
        }
    }

    /// Short technical description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Caller has no standing on this meet",
            Self::InsufficientCredits => "No meet credits available",
            Self::PaymentRequired => "Payment has not been confirmed",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::AlreadyPending => "A reschedule request is already pending",
            Self::InvalidState => "The resource does not allow this operation in its current state",
            Self::ConcurrentModification => "The resource was modified concurrently",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
        }
    }

    /// Message shown to the end user, telling them what to do next
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "You are not part of this meet.",
            Self::InsufficientCredits => {
                "You have no meet credits left with this coach. Buy more credits to book."
            }
            Self::PaymentRequired => "Complete the payment to confirm this meet.",
            Self::InvalidInput | Self::MissingRequiredField => {
                "Please choose a coach, a day and a time."
            }
            Self::ResourceNotFound => "This meet no longer exists.",
            Self::AlreadyPending => {
                "A reschedule is already waiting for approval. Wait for a response first."
            }
            Self::InvalidState => "This meet can no longer be changed.",
            Self::ConcurrentModification => {
                "This meet was just changed by someone else. Refresh and try again."
            }
            Self::ExternalServiceError => "The payment provider is unavailable. Try again later.",
            Self::ConfigInvalid | Self::InternalError | Self::StorageError => {
                "We could not save your meet. Try again later."
            }
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// User the failing operation was performed for
    pub user_id: Option<String>,
    /// Resource ID if applicable
    pub resource_id: Option<String>,
}

/// Unified error type for the meet engine
#[derive(Debug, Error)]
#[error("{}: {message}", .code.description())]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a user ID to the error context
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.context.user_id = Some(user_id.into());
        self
    }

    /// Add a resource ID to the error context
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Message to show the end user
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.code.user_message()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Error response body for a UI backend
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code
    pub code: ErrorCode,
    /// Message to display to the user
    pub message: String,
    /// Technical detail for logs and support
    pub detail: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code,
            message: error.user_message().to_owned(),
            detail: error.message.clone(),
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
    }

    /// No credits left for the client/coach pair
    pub fn insufficient_credits(client_id: &str, coach_id: &str) -> Self {
        Self::new(
            ErrorCode::InsufficientCredits,
            format!("Client {client_id} has no meet credits with coach {coach_id}"),
        )
        .with_user_id(client_id)
    }

    /// Paid flow used before payment confirmation
    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PaymentRequired, message)
    }

    /// Caller has no standing on the resource
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// A reschedule request already awaits approval for this event
    pub fn already_pending(event_id: impl Into<String>) -> Self {
        let event_id = event_id.into();
        Self::new(
            ErrorCode::AlreadyPending,
            format!("Event {event_id} already has a pending reschedule request"),
        )
        .with_resource_id(event_id)
    }

    /// Operation not allowed in the current state
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Optimistic concurrency check failed
    pub fn concurrent_modification(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConcurrentModification,
            format!("{} was modified concurrently", resource.into()),
        )
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("Serialization failed: {error}")).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::PaymentRequired.http_status(), 402);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorCode::AlreadyPending.http_status(), 409);
        assert_eq!(ErrorCode::StorageError.http_status(), 500);
    }

    #[test]
    fn test_admission_errors_have_distinct_user_messages() {
        let codes = [
            ErrorCode::InsufficientCredits,
            ErrorCode::PaymentRequired,
            ErrorCode::PermissionDenied,
            ErrorCode::AlreadyPending,
            ErrorCode::InvalidInput,
            ErrorCode::StorageError,
        ];
        let messages: HashSet<&str> = codes.iter().map(|c| c.user_message()).collect();
        assert_eq!(messages.len(), codes.len());
    }

    #[test]
    fn test_insufficient_credits_context() {
        let error = AppError::insufficient_credits("client-1", "coach-1");
        assert_eq!(error.code, ErrorCode::InsufficientCredits);
        assert_eq!(error.context.user_id.as_deref(), Some("client-1"));
        assert!(error.to_string().contains("No meet credits available"));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::already_pending("evt-1");
        let response = ErrorResponse::from(&error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ALREADY_PENDING"));
        assert!(json.contains("evt-1"));
    }
}
