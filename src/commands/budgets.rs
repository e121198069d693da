// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::user_id;
use crate::ledger::budget::{self, TrendDirection};
use crate::utils::{maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => report(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BudgetRow {
    category: String,
    limit: Option<String>,
    spent: String,
    utilization_pct: String,
    remaining: String,
    trend: String,
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = user_id(sub)?;

    // The evaluator only needs a year/month pair; any day of the requested
    // month stands in for "today".
    let as_of: NaiveDate = match sub.get_one::<String>("month") {
        Some(raw) => {
            let month = parse_month(raw)?;
            NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")?
        }
        None => Local::now().date_naive(),
    };

    let mut stmt = conn.prepare(
        "SELECT id, name, budget_limit FROM categories
         WHERE user_id=?1 AND type='expense' ORDER BY name",
    )?;
    let cats = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut data = Vec::new();
    for c in cats {
        let (cat_id, name, limit) = c?;
        let spent = budget::monthly_spending(conn, cat_id, as_of.year(), as_of.month())?;
        let utilization = budget::budget_utilization(conn, cat_id, as_of)?;
        let remaining = budget::remaining_budget(conn, cat_id, as_of)?;
        let trend = budget::spending_trend(conn, cat_id, as_of)?;
        let arrow = match trend.direction {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        };
        data.push(BudgetRow {
            category: name,
            limit,
            spent: format!("{:.2}", spent),
            utilization_pct: format!("{:.1}", utilization),
            remaining: format!("{:.2}", remaining),
            trend: format!("{} ({:.1}%)", arrow, trend.change_pct),
        });
    }

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    r.limit.clone().unwrap_or_else(|| "-".into()),
                    r.spent.clone(),
                    r.utilization_pct.clone(),
                    r.remaining.clone(),
                    r.trend.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Limit", "Spent", "Used %", "Remaining", "Trend"],
                rows
            )
        );
    }
    Ok(())
}
