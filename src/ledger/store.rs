// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::error::LedgerError;
use crate::models::{Category, Transaction, Wallet};

pub fn parse_amount(s: &str) -> Result<Decimal, LedgerError> {
    s.parse::<Decimal>()
        .map_err(|_| LedgerError::CorruptAmount(s.to_string()))
}

fn parse_date_col(s: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(format!("invalid stored date '{}'", s)))
}

pub fn get_wallet(conn: &Connection, id: i64) -> Result<Wallet, LedgerError> {
    let row: Option<(i64, i64, String, String, String, String, String, bool)> = conn
        .query_row(
            "SELECT id, user_id, name, type, currency, balance, initial_balance, is_active
             FROM wallets WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                    r.get(7)?,
                ))
            },
        )
        .optional()?;
    let (id, user_id, name, kind, currency, balance, initial, is_active) =
        row.ok_or(LedgerError::MissingWallet(id))?;
    Ok(Wallet {
        id,
        user_id,
        name,
        kind: kind
            .parse()
            .map_err(|_| LedgerError::validation(format!("invalid stored wallet type '{}'", kind)))?,
        currency,
        balance: parse_amount(&balance)?,
        initial_balance: parse_amount(&initial)?,
        is_active,
    })
}

/// The only writer of `wallets.balance` in the crate. Callers are the balance
/// mutation engine and the initial-balance editor; nothing else may touch it.
pub(crate) fn set_wallet_balance(
    conn: &Connection,
    id: i64,
    balance: Decimal,
) -> Result<(), LedgerError> {
    let n = conn.execute(
        "UPDATE wallets SET balance=?1 WHERE id=?2",
        params![balance.to_string(), id],
    )?;
    if n == 0 {
        return Err(LedgerError::MissingWallet(id));
    }
    Ok(())
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Category, LedgerError> {
    let row: Option<(i64, i64, String, String, Option<i64>, Option<String>, bool)> = conn
        .query_row(
            "SELECT id, user_id, name, type, parent_id, budget_limit, is_active
             FROM categories WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                ))
            },
        )
        .optional()?;
    let (id, user_id, name, kind, parent_id, budget_limit, is_active) =
        row.ok_or(LedgerError::MissingCategory(id))?;
    Ok(Category {
        id,
        user_id,
        name,
        kind: kind.parse().map_err(|_| {
            LedgerError::validation(format!("invalid stored category type '{}'", kind))
        })?,
        parent_id,
        budget_limit: budget_limit.as_deref().map(parse_amount).transpose()?,
        is_active,
    })
}

const TX_COLUMNS: &str = "id, user_id, amount, type, description, date, category_id, wallet_id, \
     from_wallet_id, to_wallet_id, reference, tags, notes, receipt_path, is_recurring, \
     recurring_frequency, next_occurrence, parent_transaction_id, deleted_at";

fn raw_tx(r: &Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok(RawTransaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        amount: r.get(2)?,
        kind: r.get(3)?,
        description: r.get(4)?,
        date: r.get(5)?,
        category_id: r.get(6)?,
        wallet_id: r.get(7)?,
        from_wallet_id: r.get(8)?,
        to_wallet_id: r.get(9)?,
        reference: r.get(10)?,
        tags: r.get(11)?,
        notes: r.get(12)?,
        receipt_path: r.get(13)?,
        is_recurring: r.get(14)?,
        recurring_frequency: r.get(15)?,
        next_occurrence: r.get(16)?,
        parent_transaction_id: r.get(17)?,
        deleted_at: r.get(18)?,
    })
}

struct RawTransaction {
    id: i64,
    user_id: i64,
    amount: String,
    kind: String,
    description: String,
    date: String,
    category_id: Option<i64>,
    wallet_id: Option<i64>,
    from_wallet_id: Option<i64>,
    to_wallet_id: Option<i64>,
    reference: String,
    tags: Option<String>,
    notes: Option<String>,
    receipt_path: Option<String>,
    is_recurring: bool,
    recurring_frequency: Option<String>,
    next_occurrence: Option<String>,
    parent_transaction_id: Option<i64>,
    deleted_at: Option<String>,
}

impl RawTransaction {
    fn build(self) -> Result<Transaction, LedgerError> {
        Ok(Transaction {
            id: self.id,
            user_id: self.user_id,
            amount: parse_amount(&self.amount)?,
            kind: self.kind.parse().map_err(|_| {
                LedgerError::validation(format!("invalid stored transaction type '{}'", self.kind))
            })?,
            description: self.description,
            date: parse_date_col(&self.date)?,
            category_id: self.category_id,
            wallet_id: self.wallet_id,
            from_wallet_id: self.from_wallet_id,
            to_wallet_id: self.to_wallet_id,
            reference: self.reference,
            tags: self.tags,
            notes: self.notes,
            receipt_path: self.receipt_path,
            is_recurring: self.is_recurring,
            recurring_frequency: self
                .recurring_frequency
                .as_deref()
                .map(|s| {
                    s.parse().map_err(|_| {
                        LedgerError::validation(format!("invalid stored frequency '{}'", s))
                    })
                })
                .transpose()?,
            next_occurrence: self.next_occurrence.as_deref().map(parse_date_col).transpose()?,
            parent_transaction_id: self.parent_transaction_id,
            deleted: self.deleted_at.is_some(),
        })
    }
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction, LedgerError> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1", TX_COLUMNS);
    let raw = conn
        .query_row(&sql, params![id], raw_tx)
        .optional()?
        .ok_or(LedgerError::MissingTransaction(id))?;
    raw.build()
}

/// Recurring templates due on or before `today`, oldest schedule first.
pub fn due_templates(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<Transaction>, LedgerError> {
    let sql = format!(
        "SELECT {} FROM transactions
         WHERE is_recurring=1 AND next_occurrence IS NOT NULL AND next_occurrence<=?1
           AND deleted_at IS NULL
         ORDER BY next_occurrence, id",
        TX_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let raws = stmt.query_map(params![today.to_string()], raw_tx)?;
    let mut out = Vec::new();
    for raw in raws {
        out.push(raw?.build()?);
    }
    Ok(out)
}
