// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the ledger core. Validation and funds errors are
/// returned to the caller before any mutation; a missing reference aborts the
/// whole operation so no partial balance change can land.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient funds in wallet {wallet_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        wallet_id: i64,
        balance: Decimal,
        required: Decimal,
    },

    #[error("wallet {0} not found")]
    MissingWallet(i64),

    #[error("category {0} not found")]
    MissingCategory(i64),

    #[error("transaction {0} not found")]
    MissingTransaction(i64),

    #[error("initial balance too low: minimum allowed is {minimum}")]
    InitialBalanceTooLow { minimum: Decimal },

    #[error("stored amount '{0}' is not a valid decimal")]
    CorruptAmount(String),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
