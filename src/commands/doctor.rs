// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::store;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

/// Recomputes every wallet balance from its opening balance plus the active
/// transaction log and reports any drift from the stored value.
pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();

    let mut stmt = conn.prepare("SELECT id, name FROM wallets ORDER BY id")?;
    let wallets = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;

    for w in wallets {
        let (wallet_id, name) = w?;
        let wallet = store::get_wallet(conn, wallet_id)?;
        let expected = wallet.initial_balance + log_effect(conn, wallet_id)?;
        if expected != wallet.balance {
            rows.push(vec![
                name,
                wallet.balance.to_string(),
                expected.to_string(),
                (wallet.balance - expected).to_string(),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: all wallet balances match the transaction log");
    } else {
        println!(
            "{}",
            pretty_table(&["Wallet", "Stored", "Expected", "Drift"], rows)
        );
    }
    Ok(())
}

fn log_effect(conn: &Connection, wallet_id: i64) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached(
        "SELECT amount, type, wallet_id, from_wallet_id, to_wallet_id
         FROM transactions
         WHERE deleted_at IS NULL
           AND (wallet_id=?1 OR from_wallet_id=?1 OR to_wallet_id=?1)",
    )?;
    let mut cur = stmt.query(params![wallet_id])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = cur.next()? {
        let amount: String = r.get(0)?;
        let kind: String = r.get(1)?;
        let direct: Option<i64> = r.get(2)?;
        let from: Option<i64> = r.get(3)?;
        let to: Option<i64> = r.get(4)?;
        let amount = store::parse_amount(&amount)?;
        match kind.as_str() {
            "income" if direct == Some(wallet_id) => total += amount,
            "expense" if direct == Some(wallet_id) => total -= amount,
            "transfer" => {
                if from == Some(wallet_id) {
                    total -= amount;
                }
                if to == Some(wallet_id) {
                    total += amount;
                }
            }
            _ => {}
        }
    }
    Ok(total)
}
