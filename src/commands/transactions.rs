// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::user_id;
use crate::ledger::lifecycle::{self, NewTransaction, RecurringRule, TransactionPatch};
use crate::ledger::wallet;
use crate::models::{RecurringFrequency, TransactionKind};
use crate::utils::{
    id_for_category, id_for_wallet, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn tx_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.parse::<i64>()
        .with_context(|| format!("Invalid transaction id '{}'", raw))
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let kind: TransactionKind = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap().clone();
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };

    let mut new = NewTransaction::new(user, kind, amount, description, date);
    new.reference = sub.get_one::<String>("reference").cloned();
    new.tags = sub.get_one::<String>("tags").cloned();
    new.notes = sub.get_one::<String>("notes").cloned();
    new.receipt_path = sub.get_one::<String>("receipt").cloned();

    match kind {
        TransactionKind::Income | TransactionKind::Expense => {
            let wallet_name = sub
                .get_one::<String>("wallet")
                .context("--wallet is required for income/expense")?;
            new.wallet_id = Some(id_for_wallet(conn, user, wallet_name)?);
            let category_name = sub
                .get_one::<String>("category")
                .context("--category is required for income/expense")?;
            new.category_id = Some(id_for_category(conn, user, category_name)?);
        }
        TransactionKind::Transfer => {
            let from = sub
                .get_one::<String>("from")
                .context("--from is required for transfers")?;
            let to = sub
                .get_one::<String>("to")
                .context("--to is required for transfers")?;
            new.from_wallet_id = Some(id_for_wallet(conn, user, from)?);
            new.to_wallet_id = Some(id_for_wallet(conn, user, to)?);
        }
    }

    match (
        sub.get_one::<String>("frequency"),
        sub.get_one::<String>("next"),
    ) {
        (Some(freq), Some(next)) => {
            let frequency: RecurringFrequency = freq.parse().map_err(|e: String| anyhow!(e))?;
            new.recurring = Some(RecurringRule {
                frequency,
                next_occurrence: parse_date(next)?,
            });
        }
        (None, None) => {}
        _ => bail!("--frequency and --next must be given together"),
    }

    // Funds pre-check is this layer's responsibility; the mutation engine
    // applies whatever it is told.
    match kind {
        TransactionKind::Expense => {
            wallet::check_funds(conn, new.wallet_id.unwrap(), amount)?;
        }
        TransactionKind::Transfer => {
            wallet::check_funds(conn, new.from_wallet_id.unwrap(), amount)?;
        }
        TransactionKind::Income => {}
    }

    let (created, notifications) = lifecycle::create(conn, &new, today())?;
    for n in &notifications {
        println!("{}", n.describe());
    }
    if created.is_recurring {
        println!(
            "Recurring template, next occurrence {}",
            created
                .next_occurrence
                .map(|d| d.to_string())
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let id = tx_id(sub)?;

    let mut patch = TransactionPatch::default();
    if let Some(raw) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_decimal(raw)?);
    }
    if let Some(raw) = sub.get_one::<String>("type") {
        patch.kind = Some(raw.parse().map_err(|e: String| anyhow!(e))?);
    }
    patch.description = sub.get_one::<String>("description").cloned();
    if let Some(raw) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(raw)?);
    }
    if let Some(name) = sub.get_one::<String>("wallet") {
        patch.wallet_id = Some(id_for_wallet(conn, user, name)?);
    }
    if let Some(name) = sub.get_one::<String>("from") {
        patch.from_wallet_id = Some(id_for_wallet(conn, user, name)?);
    }
    if let Some(name) = sub.get_one::<String>("to") {
        patch.to_wallet_id = Some(id_for_wallet(conn, user, name)?);
    }
    if let Some(name) = sub.get_one::<String>("category") {
        patch.category_id = Some(id_for_category(conn, user, name)?);
    }
    patch.tags = sub.get_one::<String>("tags").cloned();
    patch.notes = sub.get_one::<String>("notes").cloned();

    // Same pre-check the add path does, against the post-edit source wallet.
    if patch.amount.is_some() || patch.kind.is_some() || patch.wallet_id.is_some() {
        let old = crate::ledger::store::get_transaction(conn, id)?;
        let kind = patch.kind.unwrap_or(old.kind);
        let amount = patch.amount.unwrap_or(old.amount);
        let source = match kind {
            TransactionKind::Expense => patch.wallet_id.or(old.wallet_id),
            TransactionKind::Transfer => patch.from_wallet_id.or(old.from_wallet_id),
            TransactionKind::Income => None,
        };
        if let Some(wallet_id) = source {
            wallet::check_funds(conn, wallet_id, amount)?;
        }
    }

    let (updated, notifications) = lifecycle::update(conn, id, &patch, today())?;
    println!(
        "Updated transaction {} ({} {} on {})",
        updated.id, updated.kind, updated.amount, updated.date
    );
    for n in &notifications {
        println!("{}", n.describe());
    }
    Ok(())
}

fn rm(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = tx_id(sub)?;
    lifecycle::delete(conn, id)?;
    println!("Deleted transaction {} (balances restored)", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.reference.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.wallet.clone(),
                    r.category.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Reference", "Type", "Amount", "Wallet", "Category", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub reference: String,
    pub kind: String,
    pub amount: String,
    pub wallet: String,
    pub category: String,
    pub description: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let user = user_id(sub)?;
    let mut sql = String::from(
        "SELECT t.date, t.reference, t.type, t.amount,
                COALESCE(w.name, fw.name || ' -> ' || tw.name, ''), COALESCE(c.name, ''),
                t.description
         FROM transactions t
         LEFT JOIN wallets w ON t.wallet_id=w.id
         LEFT JOIN wallets fw ON t.from_wallet_id=fw.id
         LEFT JOIN wallets tw ON t.to_wallet_id=tw.id
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=? AND t.deleted_at IS NULL",
    );
    let mut params_vec: Vec<String> = vec![user.to_string()];

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(name) = sub.get_one::<String>("wallet") {
        sql.push_str(" AND (w.name=? OR fw.name=? OR tw.name=?)");
        params_vec.push(name.into());
        params_vec.push(name.into());
        params_vec.push(name.into());
    }
    if let Some(name) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(name.into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(TransactionRow {
            date: r.get(0)?,
            reference: r.get(1)?,
            kind: r.get(2)?,
            amount: r.get(3)?,
            wallet: r.get(4)?,
            category: r.get(5)?,
            description: r.get(6)?,
        });
    }
    Ok(data)
}
