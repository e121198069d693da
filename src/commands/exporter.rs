// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::user_id;
use anyhow::Result;
use rusqlite::{params, Connection};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT t.date, t.reference, t.type, t.amount,
                COALESCE(w.name, fw.name || ' -> ' || tw.name, '') AS wallet,
                c.name AS category, t.description, t.tags, t.notes
         FROM transactions t
         LEFT JOIN wallets w ON t.wallet_id=w.id
         LEFT JOIN wallets fw ON t.from_wallet_id=fw.id
         LEFT JOIN wallets tw ON t.to_wallet_id=tw.id
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=?1 AND t.deleted_at IS NULL
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, Option<String>>(7)?,
            r.get::<_, Option<String>>(8)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "reference",
                "type",
                "amount",
                "wallet",
                "category",
                "description",
                "tags",
                "notes",
            ])?;
            for row in rows {
                let (d, refc, t, amt, w, cat, desc, tags, notes) = row?;
                wtr.write_record([
                    d,
                    refc,
                    t,
                    amt,
                    w,
                    cat.unwrap_or_default(),
                    desc,
                    tags.unwrap_or_default(),
                    notes.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, refc, t, amt, w, cat, desc, tags, notes) = row?;
                items.push(json!({
                    "date": d, "reference": refc, "type": t, "amount": amt,
                    "wallet": w, "category": cat, "description": desc,
                    "tags": tags, "notes": notes
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
