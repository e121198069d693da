// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget evaluator: read-only queries over the transaction log. Budget
//! limits are monthly, so every comparison is scoped to one calendar month —
//! never lifetime totals. Callers pass the month (or `today`) explicitly.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;
use super::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingTrend {
    pub current: Decimal,
    pub previous: Decimal,
    pub change: Decimal,
    pub change_pct: Decimal,
    pub direction: TrendDirection,
}

/// Sum of active expense transactions for the category in the given month.
pub fn monthly_spending(
    conn: &Connection,
    category_id: i64,
    year: i32,
    month: u32,
) -> Result<Decimal, LedgerError> {
    let ym = format!("{:04}-{:02}", year, month);
    let mut stmt = conn.prepare_cached(
        "SELECT amount FROM transactions
         WHERE category_id=?1 AND type='expense' AND deleted_at IS NULL
           AND substr(date,1,7)=?2",
    )?;
    let mut rows = stmt.query(params![category_id, ym])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let amount: String = r.get(0)?;
        total += store::parse_amount(&amount)?;
    }
    Ok(total)
}

pub fn is_budget_exceeded(
    conn: &Connection,
    category_id: i64,
    today: NaiveDate,
) -> Result<bool, LedgerError> {
    let category = store::get_category(conn, category_id)?;
    match category.budget_limit {
        Some(limit) if limit > Decimal::ZERO => {
            let spent = monthly_spending(conn, category_id, today.year(), today.month())?;
            Ok(spent > limit)
        }
        _ => Ok(false),
    }
}

/// Spending as a percentage of the monthly limit; 0 when no limit is set.
pub fn budget_utilization(
    conn: &Connection,
    category_id: i64,
    today: NaiveDate,
) -> Result<Decimal, LedgerError> {
    let category = store::get_category(conn, category_id)?;
    match category.budget_limit {
        Some(limit) if limit > Decimal::ZERO => {
            let spent = monthly_spending(conn, category_id, today.year(), today.month())?;
            Ok(spent / limit * Decimal::ONE_HUNDRED)
        }
        _ => Ok(Decimal::ZERO),
    }
}

pub fn remaining_budget(
    conn: &Connection,
    category_id: i64,
    today: NaiveDate,
) -> Result<Decimal, LedgerError> {
    let category = store::get_category(conn, category_id)?;
    match category.budget_limit {
        Some(limit) if limit > Decimal::ZERO => {
            let spent = monthly_spending(conn, category_id, today.year(), today.month())?;
            Ok((limit - spent).max(Decimal::ZERO))
        }
        _ => Ok(Decimal::ZERO),
    }
}

/// Current-month spending compared against the previous calendar month.
pub fn spending_trend(
    conn: &Connection,
    category_id: i64,
    today: NaiveDate,
) -> Result<SpendingTrend, LedgerError> {
    let (year, month) = (today.year(), today.month());
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    let current = monthly_spending(conn, category_id, year, month)?;
    let previous = monthly_spending(conn, category_id, prev_year, prev_month)?;
    let change = current - previous;
    let change_pct = if previous.is_zero() {
        Decimal::ZERO
    } else {
        change / previous * Decimal::ONE_HUNDRED
    };
    let direction = if change > Decimal::ZERO {
        TrendDirection::Up
    } else if change < Decimal::ZERO {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    Ok(SpendingTrend {
        current,
        previous,
        change,
        change_pct,
        direction,
    })
}
