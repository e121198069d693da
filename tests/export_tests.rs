// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::cli;
use pocketledger::commands;
use pocketledger::db;
use pocketledger::ledger::lifecycle::{self, NewTransaction};
use pocketledger::ledger::wallet::{self, NewWallet};
use pocketledger::models::{TransactionKind, WalletKind};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn seed(conn: &mut Connection) -> i64 {
    let w = wallet::create_wallet(
        conn,
        &NewWallet {
            user_id: 1,
            name: "Main".into(),
            kind: WalletKind::BankAccount,
            currency: "USD".into(),
            initial_balance: dec("1000"),
        },
    )
    .unwrap()
    .id;
    conn.execute(
        "INSERT INTO categories(user_id, name, type) VALUES (1,'Groceries','expense')",
        [],
    )
    .unwrap();
    let cat = conn.last_insert_rowid();

    let mut new = NewTransaction::new(1, TransactionKind::Expense, dec("42.50"), "weekly shop", d("2024-03-10"));
    new.wallet_id = Some(w);
    new.category_id = Some(cat);
    let (tx, _) = lifecycle::create(conn, &new, d("2024-03-10")).unwrap();

    // A deleted row must never leak into exports.
    let mut gone = NewTransaction::new(1, TransactionKind::Expense, dec("5"), "mistake", d("2024-03-11"));
    gone.wallet_id = Some(w);
    gone.category_id = Some(cat);
    let (gone, _) = lifecycle::create(conn, &gone, d("2024-03-11")).unwrap();
    lifecycle::delete(conn, gone.id).unwrap();

    tx.id
}

fn export_matches(out: &str, format: &str) -> clap::ArgMatches {
    cli::build_cli()
        .try_get_matches_from([
            "pocketledger",
            "export",
            "transactions",
            "--format",
            format,
            "--out",
            out,
        ])
        .unwrap()
}

#[test]
fn csv_export_writes_active_rows_only() {
    let mut conn = setup();
    seed(&mut conn);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    let matches = export_matches(out.to_str().unwrap(), "csv");
    let Some(("export", sub)) = matches.subcommand() else {
        panic!("expected export subcommand");
    };
    commands::exporter::handle(&conn, sub).unwrap();

    let content = std::fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,reference,type,amount,wallet,category,description,tags,notes"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("2024-03-10,EXP-20240310-"));
    assert!(row.contains("weekly shop"));
    assert!(row.contains("Main"));
    assert!(row.contains("Groceries"));
    assert!(lines.next().is_none());
}

#[test]
fn json_export_round_trips_through_serde() {
    let mut conn = setup();
    seed(&mut conn);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tx.json");
    let matches = export_matches(out.to_str().unwrap(), "json");
    let Some(("export", sub)) = matches.subcommand() else {
        panic!("expected export subcommand");
    };
    commands::exporter::handle(&conn, sub).unwrap();

    let content = std::fs::read_to_string(&out).unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["amount"], "42.50");
    assert_eq!(items[0]["wallet"], "Main");
    assert_eq!(items[0]["description"], "weekly shop");
}
