// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::store;
use crate::models::{Wallet, WalletKind};

#[derive(Debug, Clone)]
pub struct NewWallet {
    pub user_id: i64,
    pub name: String,
    pub kind: WalletKind,
    pub currency: String,
    pub initial_balance: Decimal,
}

/// A wallet opens with `balance = initial_balance`; from then on the balance
/// only moves through the mutation engine or `edit_initial_balance`.
pub fn create_wallet(conn: &Connection, new: &NewWallet) -> Result<Wallet, LedgerError> {
    conn.execute(
        "INSERT INTO wallets(user_id, name, type, currency, balance, initial_balance)
         VALUES (?1,?2,?3,?4,?5,?5)",
        params![
            new.user_id,
            new.name,
            new.kind.as_str(),
            new.currency.to_uppercase(),
            new.initial_balance.to_string(),
        ],
    )?;
    store::get_wallet(conn, conn.last_insert_rowid())
}

/// Change the opening balance after transactions have accrued, shifting the
/// current balance by the same delta so the ledger invariant keeps holding.
/// Rejected outright if the shifted balance would go negative; the error
/// carries the smallest initial balance the wallet can take.
pub fn edit_initial_balance(
    conn: &mut Connection,
    wallet_id: i64,
    new_initial: Decimal,
) -> Result<Wallet, LedgerError> {
    let tx = conn.transaction()?;
    let wallet = store::get_wallet(&tx, wallet_id)?;

    let delta = new_initial - wallet.initial_balance;
    let candidate = wallet.balance + delta;
    if candidate < Decimal::ZERO {
        return Err(LedgerError::InitialBalanceTooLow {
            minimum: wallet.initial_balance - wallet.balance,
        });
    }

    tx.execute(
        "UPDATE wallets SET initial_balance=?1, balance=?2 WHERE id=?3",
        params![new_initial.to_string(), candidate.to_string(), wallet_id],
    )?;
    tx.commit()?;
    store::get_wallet(conn, wallet_id)
}

/// Funds-sufficiency pre-check performed by the creating or editing
/// collaborator (and the recurring generator) before a decreasing mutation.
/// The mutation engine itself does not re-validate this, so that apply and
/// reverse stay exact inverses.
pub fn check_funds(
    conn: &Connection,
    wallet_id: i64,
    required: Decimal,
) -> Result<(), LedgerError> {
    let wallet = store::get_wallet(conn, wallet_id)?;
    if required > wallet.balance {
        return Err(LedgerError::InsufficientFunds {
            wallet_id,
            balance: wallet.balance,
            required,
        });
    }
    Ok(())
}
