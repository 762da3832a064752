// ABOUTME: Unified error handling re-exported from pierre-meets-core
// ABOUTME: AppError, AppResult and ErrorCode shared by every service and store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_meets_core::errors::*;
