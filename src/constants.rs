// ABOUTME: Meet scheduling constants re-exported from pierre-meets-core
// ABOUTME: Durations, identifiers, display formats and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_meets_core::constants::*;
