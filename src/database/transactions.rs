// ABOUTME: RAII transaction guard for multi-statement meet operations
// ABOUTME: Rolls back automatically on drop so a failed booking or reschedule leaves no partial rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management with an RAII guard
//!
//! Every service operation that writes more than one row (credit decrement +
//! meet insert + participant insert, or request insert + event update) runs
//! inside one `TransactionGuard`:
//!
//! ```text
//! let mut guard = TransactionGuard::begin(database.pool(), "request_booking").await?;
//! ledger.decrement_in(guard.executor()?, client_id, coach_id).await?;
//! events.insert_event(guard.executor()?, &event).await?;
//! guard.commit().await?;
//! ```
//!
//! Returning early with `?` drops the guard and `SQLx` rolls the transaction
//! back. Nothing is retried: a storage failure is surfaced to the caller.
//!
//! Transactions start with `BEGIN IMMEDIATE`: the write lock is held from the
//! first read, and contending writers queue on `busy_timeout` rather than
//! failing a lock upgrade.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

/// Takes the database write lock up front
const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE";

use crate::errors::{AppError, AppResult};

/// RAII guard for a `SQLite` transaction
pub struct TransactionGuard {
    transaction: Option<Transaction<'static, Sqlite>>,
    operation: &'static str,
}

impl TransactionGuard {
    /// Begin a write transaction for the named operation
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or the write lock
    /// is not granted within the busy timeout
    pub async fn begin(pool: &SqlitePool, operation: &'static str) -> AppResult<Self> {
        let transaction = pool.begin_with(BEGIN_IMMEDIATE).await.map_err(|e| {
            AppError::storage(format!("Failed to begin transaction for {operation}: {e}"))
        })?;
        debug!(db.operation = operation, "Transaction started");
        Ok(Self {
            transaction: Some(transaction),
            operation,
        })
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails or the guard was already consumed
    pub async fn commit(mut self) -> AppResult<()> {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot commit"))?;
        transaction.commit().await.map_err(|e| {
            AppError::storage(format!(
                "Transaction commit failed for {}: {e}",
                self.operation
            ))
        })?;
        debug!(db.operation = self.operation, "Transaction committed");
        Ok(())
    }

    /// Connection to run statements on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit")
        })
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!(
                db.operation = self.operation,
                "Transaction dropped without commit - rolling back"
            );
        }
    }
}
