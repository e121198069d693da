// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::db;
use pocketledger::ledger::lifecycle::{self, NewTransaction, RecurringRule};
use pocketledger::ledger::notify::Notification;
use pocketledger::ledger::recurring;
use pocketledger::ledger::store;
use pocketledger::ledger::wallet::{self, NewWallet};
use pocketledger::models::{RecurringFrequency, TransactionKind, WalletKind};
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

fn add_wallet(conn: &Connection, name: &str, initial: &str) -> i64 {
    wallet::create_wallet(
        conn,
        &NewWallet {
            user_id: 1,
            name: name.into(),
            kind: WalletKind::BankAccount,
            currency: "USD".into(),
            initial_balance: dec(initial),
        },
    )
    .unwrap()
    .id
}

fn add_category(conn: &Connection, name: &str, kind: &str) -> i64 {
    conn.execute(
        "INSERT INTO categories(user_id, name, type) VALUES (1,?1,?2)",
        params![name, kind],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn balance_of(conn: &Connection, id: i64) -> Decimal {
    store::get_wallet(conn, id).unwrap().balance
}

/// Monthly expense template: 50 against the wallet, scheduled from the given
/// occurrence date.
fn expense_template(
    conn: &mut Connection,
    wallet_id: i64,
    category_id: i64,
    amount: &str,
    next: &str,
) -> i64 {
    let mut new = NewTransaction::new(1, TransactionKind::Expense, dec(amount), "rent", d("2024-01-01"));
    new.wallet_id = Some(wallet_id);
    new.category_id = Some(category_id);
    new.recurring = Some(RecurringRule {
        frequency: RecurringFrequency::Monthly,
        next_occurrence: d(next),
    });
    lifecycle::create(conn, &new, d("2024-01-01")).unwrap().0.id
}

#[test]
fn due_template_spawns_one_instance_and_advances() {
    let mut conn = setup();
    let w = add_wallet(&conn, "Main", "1000");
    let cat = add_category(&conn, "Rent", "expense");
    let template_id = expense_template(&mut conn, w, cat, "50", "2024-01-01");
    let after_template = balance_of(&conn, w);

    let report = recurring::run(&mut conn, d("2024-01-15"), false).unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.failed, 0);

    // Exactly one child, stamped with today and pointing back at the template.
    let (child_id, date, is_recurring): (i64, String, bool) = conn
        .query_row(
            "SELECT id, date, is_recurring FROM transactions WHERE parent_transaction_id=?1",
            params![template_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(date, "2024-01-15");
    assert!(!is_recurring);

    let template = store::get_transaction(&conn, template_id).unwrap();
    assert_eq!(template.next_occurrence, Some(d("2024-02-01")));
    assert!(template.is_recurring);

    assert_eq!(balance_of(&conn, w), after_template - dec("50"));
    assert!(report.notifications.iter().any(|n| matches!(
        n,
        Notification::RecurringGenerated { template_id: t, transaction_id: c, .. }
            if *t == template_id && *c == child_id
    )));
}

#[test]
fn not_due_templates_are_left_alone() {
    let mut conn = setup();
    let w = add_wallet(&conn, "Main", "1000");
    let cat = add_category(&conn, "Rent", "expense");
    expense_template(&mut conn, w, cat, "50", "2024-02-01");

    let report = recurring::run(&mut conn, d("2024-01-15"), false).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 0);
}

#[test]
fn insufficient_funds_fails_one_template_without_blocking_others() {
    let mut conn = setup();
    let rich = add_wallet(&conn, "Rich", "1000");
    let poor = add_wallet(&conn, "Poor", "60");
    let cat = add_category(&conn, "Rent", "expense");

    // Template creation itself spends once from each wallet.
    let ok_template = expense_template(&mut conn, rich, cat, "50", "2024-01-01");
    let bad_template = expense_template(&mut conn, poor, cat, "50", "2024-01-01");
    assert_eq!(balance_of(&conn, poor), dec("10"));

    let report = recurring::run(&mut conn, d("2024-01-15"), false).unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(&bad_template.to_string()));

    // The failed template kept its schedule and its wallet.
    let bad = store::get_transaction(&conn, bad_template).unwrap();
    assert_eq!(bad.next_occurrence, Some(d("2024-01-01")));
    assert_eq!(balance_of(&conn, poor), dec("10"));

    let ok = store::get_transaction(&conn, ok_template).unwrap();
    assert_eq!(ok.next_occurrence, Some(d("2024-02-01")));
}

#[test]
fn dry_run_previews_without_writing() {
    let mut conn = setup();
    let w = add_wallet(&conn, "Main", "1000");
    let cat = add_category(&conn, "Rent", "expense");
    let template_id = expense_template(&mut conn, w, cat, "50", "2024-01-01");
    let before = balance_of(&conn, w);

    let report = recurring::run(&mut conn, d("2024-01-15"), true).unwrap();
    assert_eq!(report.previews.len(), 1);
    assert_eq!(report.created, 0);

    let children: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM transactions WHERE parent_transaction_id=?1",
            params![template_id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(children, 0);
    assert_eq!(balance_of(&conn, w), before);
    let template = store::get_transaction(&conn, template_id).unwrap();
    assert_eq!(template.next_occurrence, Some(d("2024-01-01")));
}

#[test]
fn one_run_generates_at_most_once_per_template() {
    let mut conn = setup();
    let w = add_wallet(&conn, "Main", "1000");
    let cat = add_category(&conn, "Rent", "expense");
    // Long overdue: still only one instance per invocation, schedule stepped
    // by exactly one period.
    let template_id = expense_template(&mut conn, w, cat, "50", "2023-10-01");

    let report = recurring::run(&mut conn, d("2024-01-15"), false).unwrap();
    assert_eq!(report.created, 1);
    let template = store::get_transaction(&conn, template_id).unwrap();
    assert_eq!(template.next_occurrence, Some(d("2023-11-01")));

    // A second run picks it up again, once more.
    let report = recurring::run(&mut conn, d("2024-01-15"), false).unwrap();
    assert_eq!(report.created, 1);
    let template = store::get_transaction(&conn, template_id).unwrap();
    assert_eq!(template.next_occurrence, Some(d("2023-12-01")));
}

#[test]
fn generated_transfer_goes_through_the_same_hook() {
    let mut conn = setup();
    let a = add_wallet(&conn, "A", "1000");
    let b = add_wallet(&conn, "B", "0");

    let mut new = NewTransaction::new(1, TransactionKind::Transfer, dec("100"), "sweep", d("2024-01-01"));
    new.from_wallet_id = Some(a);
    new.to_wallet_id = Some(b);
    new.recurring = Some(RecurringRule {
        frequency: RecurringFrequency::Weekly,
        next_occurrence: d("2024-01-08"),
    });
    let template_id = lifecycle::create(&mut conn, &new, d("2024-01-01")).unwrap().0.id;
    assert_eq!(balance_of(&conn, a), dec("900"));

    let report = recurring::run(&mut conn, d("2024-01-08"), false).unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(balance_of(&conn, a), dec("800"));
    assert_eq!(balance_of(&conn, b), dec("200"));

    let template = store::get_transaction(&conn, template_id).unwrap();
    assert_eq!(template.next_occurrence, Some(d("2024-01-15")));
}

#[test]
fn schedule_stepping_per_frequency() {
    use RecurringFrequency::*;
    let from = d("2024-01-31");
    assert_eq!(recurring::advance(from, Some(Daily)).unwrap(), d("2024-02-01"));
    assert_eq!(recurring::advance(from, Some(Weekly)).unwrap(), d("2024-02-07"));
    // Calendar-aware month stepping clamps to the shorter month.
    assert_eq!(recurring::advance(from, Some(Monthly)).unwrap(), d("2024-02-29"));
    assert_eq!(recurring::advance(from, Some(Quarterly)).unwrap(), d("2024-04-30"));
    assert_eq!(recurring::advance(from, Some(Semiannually)).unwrap(), d("2024-07-31"));
    assert_eq!(recurring::advance(from, Some(Yearly)).unwrap(), d("2025-01-31"));
    // Missing frequency defaults to monthly.
    assert_eq!(recurring::advance(from, None).unwrap(), d("2024-02-29"));

    // Always strictly forward.
    for freq in [Daily, Weekly, Monthly, Quarterly, Semiannually, Yearly] {
        assert!(recurring::advance(from, Some(freq)).unwrap() > from);
    }
}
