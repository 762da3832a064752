// ABOUTME: Meet scheduling models re-exported from pierre-meets-core
// ABOUTME: Meets, participants, reschedule requests, credit balances and booking input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_meets_core::models::*;
