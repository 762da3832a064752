// ABOUTME: Core data models for meet scheduling
// ABOUTME: Meet events, participants, reschedule requests, credit balances and booking input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meet Models
//!
//! Persisted entities (`MeetEvent`, `Participant`, `RescheduleRequest`,
//! `CreditBalance`) and the transient values exchanged with the UI layer
//! (`BookingRequestContext`, `BookingConfirmation`, `ReschedulePreview`,
//! `CommitOutcome`).

mod booking;
mod credit;
mod meet;
mod reschedule;

pub use booking::{BookingConfirmation, BookingRequestContext, PaidMeetTerms};
pub use credit::CreditBalance;
pub use meet::{MeetEvent, MeetEventStatus, MeetEventType, Participant, ParticipantRole, RsvpStatus};
pub use reschedule::{CommitOutcome, ReschedulePreview, RescheduleRequest, RescheduleStatus};
