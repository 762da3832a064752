// ABOUTME: Meet credit ledger keyed by (client, coach) with an atomic floor-checked decrement
// ABOUTME: Balances never go negative, even under concurrent bookings for the same pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::{AppError, AppResult};
use crate::models::CreditBalance;

/// Meet credit ledger operations
///
/// Grants are made by the purchase flow outside this crate; the ledger only
/// reads and spends. Spending is a single conditional `UPDATE ... WHERE
/// credits_available > 0`, so the floor check and the decrement are one
/// atomic statement and two concurrent bookings cannot both spend the last
/// credit.
#[derive(Clone)]
pub struct CreditLedger {
    pool: SqlitePool,
}

impl CreditLedger {
    /// Create a new credit ledger
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current balance for a pair; zero when no ledger row exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_balance(&self, client_id: &str, coach_id: &str) -> AppResult<CreditBalance> {
        let row = sqlx::query(
            r"
            SELECT credits_available FROM client_meet_credits
            WHERE client_id = $1 AND coach_id = $2
            ",
        )
        .bind(client_id)
        .bind(coach_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("Failed to read meet credits: {e}")))?;

        row.map_or_else(
            || Ok(CreditBalance::empty(client_id, coach_id)),
            |r| {
                Ok(CreditBalance {
                    client_id: client_id.to_owned(),
                    coach_id: coach_id.to_owned(),
                    credits_available: credits_from_column(r.get("credits_available"))?,
                })
            },
        )
    }

    /// Spend one credit as a standalone statement
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCredits` when the balance is zero or missing,
    /// or a storage error if the update fails
    pub async fn decrement(&self, client_id: &str, coach_id: &str) -> AppResult<CreditBalance> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::storage(format!("Failed to acquire connection: {e}")))?;
        Self::decrement_in(&mut conn, client_id, coach_id).await
    }

    /// Spend one credit on an existing connection or transaction
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCredits` when the balance is zero or missing,
    /// or a storage error if the update fails
    pub async fn decrement_in(
        conn: &mut SqliteConnection,
        client_id: &str,
        coach_id: &str,
    ) -> AppResult<CreditBalance> {
        let row = sqlx::query(
            r"
            UPDATE client_meet_credits
            SET credits_available = credits_available - 1, updated_at = $3
            WHERE client_id = $1 AND coach_id = $2 AND credits_available > 0
            RETURNING credits_available
            ",
        )
        .bind(client_id)
        .bind(coach_id)
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::storage(format!("Failed to spend meet credit: {e}")))?;

        row.map_or_else(
            || Err(AppError::insufficient_credits(client_id, coach_id)),
            |r| {
                Ok(CreditBalance {
                    client_id: client_id.to_owned(),
                    coach_id: coach_id.to_owned(),
                    credits_available: credits_from_column(r.get("credits_available"))?,
                })
            },
        )
    }
}

/// Convert the stored balance; out-of-range values mean a corrupt row
fn credits_from_column(value: i64) -> AppResult<u32> {
    u32::try_from(value).map_err(|e| {
        AppError::internal(format!(
            "Invalid credits_available value {value}: {e}"
        ))
    })
}
