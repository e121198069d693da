// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::user_id;
use crate::ledger::wallet::{self, NewWallet};
use crate::models::WalletKind;
use crate::utils::{id_for_wallet, parse_decimal, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("set-initial", sub)) => set_initial(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let name = sub.get_one::<String>("name").unwrap();
    let kind: WalletKind = sub
        .get_one::<String>("type")
        .unwrap()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let currency = sub.get_one::<String>("currency").unwrap().to_uppercase();
    let initial = parse_decimal(sub.get_one::<String>("initial").unwrap())?;

    let created = wallet::create_wallet(
        conn,
        &NewWallet {
            user_id: user,
            name: name.clone(),
            kind,
            currency,
            initial_balance: initial,
        },
    )?;
    println!(
        "Added wallet '{}' ({}, {}) with balance {}",
        created.name, created.kind, created.currency, created.balance
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let mut stmt = conn.prepare(
        "SELECT name, type, currency, balance, initial_balance, is_active
         FROM wallets WHERE user_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, bool>(5)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (n, t, c, b, i, active) = row?;
        data.push(vec![
            n,
            t,
            c,
            b,
            i,
            if active { "yes".into() } else { "no".into() },
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["Name", "Type", "CCY", "Balance", "Initial", "Active"],
            data
        )
    );
    Ok(())
}

fn set_initial(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = user_id(sub)?;
    let name = sub.get_one::<String>("name").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let wallet_id = id_for_wallet(conn, user, name)?;

    let updated = wallet::edit_initial_balance(conn, wallet_id, amount)?;
    println!(
        "Wallet '{}': initial balance {} -> current balance {}",
        updated.name, updated.initial_balance, updated.balance
    );
    Ok(())
}
