// ABOUTME: Main library entry point for the Pierre meet scheduling engine
// ABOUTME: Booking admission, credit ledger, reschedule negotiation and their storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Pierre Meets
//!
//! The engine behind coach/client 1:1 meets: a client books a slot with a
//! coach by spending a meet credit (or after paying for it), and either side
//! can later move the slot. Moves are applied directly while nobody else has
//! engaged with the booking, and otherwise go through a propose/approve
//! negotiation with the counterparty.
//!
//! ## Architecture
//!
//! - **database**: `SQLite` storage for meets, participants, reschedule requests and credits
//! - **services**: Booking, reschedule and attendance operations
//! - **payments**: Payment gate adapter for the paid checkout flow
//! - **notifications**: Fire-and-forget delivery of booking and reschedule events
//! - **config** / **logging**: Environment configuration and structured logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{NaiveDate, NaiveTime};
//! use pierre_meets::config::{BookingConfig, DatabaseConfig};
//! use pierre_meets::database::Database;
//! use pierre_meets::models::BookingRequestContext;
//! use pierre_meets::notifications::LogNotificationSink;
//! use pierre_meets::services::BookingService;
//!
//! # async fn example() -> pierre_meets::errors::AppResult<()> {
//! let database = Database::new(&DatabaseConfig::in_memory()).await?;
//! let booking = BookingService::new(
//!     database,
//!     Arc::new(LogNotificationSink),
//!     BookingConfig::default(),
//! )?;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap_or_default();
//! let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default();
//! let context = BookingRequestContext::credit_meet("coach-1", day, time);
//! let confirmation = booking.request_booking(&context, "client-1").await?;
//! println!("Booked {}", confirmation.formatted_time_range);
//! # Ok(())
//! # }
//! ```

/// Unified error handling re-exported from the core crate
pub mod errors;

/// Meet scheduling constants
pub mod constants;

/// Data models re-exported from the core crate
pub mod models;

/// Environment configuration
pub mod config;

/// Logging configuration and structured domain events
pub mod logging;

/// `SQLite` storage: meets, participants, reschedule requests and credits
pub mod database;

/// Booking, reschedule and attendance services
pub mod services;

/// Payment gate contract and HTTP adapter
pub mod payments;

/// Notification sinks for booking and reschedule events
pub mod notifications;
