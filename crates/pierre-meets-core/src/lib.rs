// ABOUTME: Core types and constants for Pierre coach/client meet scheduling
// ABOUTME: Foundation crate with error handling, meet models, formatters, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Meets Core
//!
//! Foundation crate providing shared types and constants for the meet
//! scheduling subsystem. It has no storage or runtime dependencies so the
//! booking, reschedule and credit services can share one vocabulary with any
//! UI backend that calls them.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Meet events, participants, reschedule requests and credit balances
//! - **constants**: Durations, limits and stable identifiers
//! - **formatters**: Fixed-offset date and time-range display

/// Unified error handling system with standard error codes
pub mod errors;

/// Meet scheduling constants
pub mod constants;

/// Core data models (`MeetEvent`, `Participant`, `RescheduleRequest`, ...)
pub mod models;

/// Display formatting for meet confirmations
pub mod formatters;
