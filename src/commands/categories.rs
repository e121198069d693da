// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::user_id;
use crate::models::CategoryKind;
use crate::utils::{id_for_category, parse_decimal, pretty_table};
use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("set-budget", sub)) => set_budget(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let name = sub.get_one::<String>("name").unwrap();
    let kind: CategoryKind = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let parent_id = sub
        .get_one::<String>("parent")
        .map(|p| id_for_category(conn, user, p))
        .transpose()?;
    let budget = sub
        .get_one::<String>("budget")
        .map(|b| parse_decimal(b))
        .transpose()?;
    if let Some(limit) = budget {
        if limit < Decimal::ZERO {
            bail!("Budget limit must not be negative");
        }
    }

    conn.execute(
        "INSERT INTO categories(user_id, name, type, parent_id, budget_limit)
         VALUES (?1,?2,?3,?4,?5)",
        params![
            user,
            name,
            kind.as_str(),
            parent_id,
            budget.map(|b| b.to_string())
        ],
    )?;
    println!("Added category '{}' ({})", name, kind);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let mut stmt = conn.prepare(
        "SELECT c.name, c.type, p.name, c.budget_limit
         FROM categories c LEFT JOIN categories p ON c.parent_id=p.id
         WHERE c.user_id=?1 ORDER BY c.name",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (n, t, parent, limit) = row?;
        data.push(vec![
            n,
            t,
            parent.unwrap_or_default(),
            limit.unwrap_or_else(|| "-".into()),
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Name", "Type", "Parent", "Monthly limit"], data)
    );
    Ok(())
}

fn set_budget(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let name = sub.get_one::<String>("name").unwrap();
    let cat_id = id_for_category(conn, user, name)?;

    if sub.get_flag("clear") {
        conn.execute(
            "UPDATE categories SET budget_limit=NULL WHERE id=?1",
            params![cat_id],
        )?;
        println!("Cleared budget limit for '{}'", name);
        return Ok(());
    }

    let limit = match sub.get_one::<String>("limit") {
        Some(raw) => parse_decimal(raw)?,
        None => bail!("Either --limit or --clear is required"),
    };
    if limit < Decimal::ZERO {
        bail!("Budget limit must not be negative");
    }
    conn.execute(
        "UPDATE categories SET budget_limit=?1 WHERE id=?2",
        params![limit.to_string(), cat_id],
    )?;
    println!("Budget limit for '{}' set to {} per month", name, limit);
    Ok(())
}
