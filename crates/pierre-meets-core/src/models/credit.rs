// ABOUTME: Meet credit balance model for a client/coach pair
// ABOUTME: Credits are granted externally and spent one per non-paid booking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Remaining meet credits a client holds with one coach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    /// Client who owns the credits
    pub client_id: String,
    /// Coach the credits can be spent with
    pub coach_id: String,
    /// Credits left, never negative
    pub credits_available: u32,
}

impl CreditBalance {
    /// Balance for a pair with no ledger row
    #[must_use]
    pub fn empty(client_id: &str, coach_id: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            coach_id: coach_id.to_owned(),
            credits_available: 0,
        }
    }

    /// Whether at least one meet can be booked with these credits
    #[must_use]
    pub const fn can_book(&self) -> bool {
        self.credits_available > 0
    }
}
