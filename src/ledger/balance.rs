// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance mutation engine: the single authority over `wallets.balance`.
//!
//! `apply` and `reverse` are exact algebraic inverses and take the effect's
//! parameters explicitly rather than a live record. During an update the
//! in-memory transaction already holds the new values, so the reversal of the
//! old effect must be driven by the prior row state.

use rusqlite::Connection;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::store;
use crate::models::TransactionKind;

/// Post-mutation state of one touched wallet. `decreased` marks the wallets
/// whose balance went down (expense wallet, transfer source) — only those are
/// candidates for a low-balance alert.
#[derive(Debug, Clone)]
pub struct WalletDelta {
    pub wallet_id: i64,
    pub balance: Decimal,
    pub decreased: bool,
}

/// Wallet references of a transaction's effect, one or two depending on kind.
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub wallet_id: Option<i64>,
    pub from_wallet_id: Option<i64>,
    pub to_wallet_id: Option<i64>,
}

pub fn apply(conn: &Connection, effect: Effect) -> Result<Vec<WalletDelta>, LedgerError> {
    shift(conn, effect, false)
}

pub fn reverse(conn: &Connection, effect: Effect) -> Result<Vec<WalletDelta>, LedgerError> {
    shift(conn, effect, true)
}

fn shift(
    conn: &Connection,
    effect: Effect,
    reversed: bool,
) -> Result<Vec<WalletDelta>, LedgerError> {
    let amount = effect.amount;
    let steps: Vec<(i64, Decimal)> = match effect.kind {
        TransactionKind::Income => {
            let id = require(effect.wallet_id, "income effect without wallet_id")?;
            vec![(id, amount)]
        }
        TransactionKind::Expense => {
            let id = require(effect.wallet_id, "expense effect without wallet_id")?;
            vec![(id, -amount)]
        }
        TransactionKind::Transfer => {
            let from = require(effect.from_wallet_id, "transfer effect without from_wallet_id")?;
            let to = require(effect.to_wallet_id, "transfer effect without to_wallet_id")?;
            vec![(from, -amount), (to, amount)]
        }
    };

    let mut deltas = Vec::with_capacity(steps.len());
    for (wallet_id, signed) in steps {
        let signed = if reversed { -signed } else { signed };
        // Missing wallet is a hard failure; the caller's transaction boundary
        // rolls back anything already shifted.
        let wallet = store::get_wallet(conn, wallet_id)?;
        let balance = wallet.balance + signed;
        store::set_wallet_balance(conn, wallet_id, balance)?;
        deltas.push(WalletDelta {
            wallet_id,
            balance,
            decreased: signed < Decimal::ZERO,
        });
    }
    Ok(deltas)
}

fn require(id: Option<i64>, what: &str) -> Result<i64, LedgerError> {
    id.ok_or_else(|| LedgerError::validation(what))
}
