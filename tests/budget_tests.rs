// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::db;
use pocketledger::ledger::budget::{self, TrendDirection};
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

fn add_wallet(conn: &Connection) -> i64 {
    wallet::create_wallet(
        conn,
        &NewWallet {
            user_id: 1,
            name: "Main".into(),
            kind: WalletKind::BankAccount,
            currency: "USD".into(),
            initial_balance: dec("100000"),
        },
    )
    .unwrap()
    .id
}

fn add_category(conn: &Connection, name: &str, kind: &str, limit: Option<&str>) -> i64 {
    conn.execute(
        "INSERT INTO categories(user_id, name, type, budget_limit) VALUES (1,?1,?2,?3)",
        params![name, kind, limit],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn expense(conn: &mut Connection, wallet: i64, category: i64, amount: &str, date: &str) -> i64 {
    let mut new = NewTransaction::new(1, TransactionKind::Expense, dec(amount), "spend", d(date));
    new.wallet_id = Some(wallet);
    new.category_id = Some(category);
    lifecycle::create(conn, &new, d(date)).unwrap().0.id
}

#[test]
fn spending_is_scoped_to_the_calendar_month() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);

    expense(&mut conn, w, cat, "100", "2024-02-28");
    expense(&mut conn, w, cat, "40", "2024-03-05");
    expense(&mut conn, w, cat, "60", "2024-03-20");

    assert_eq!(budget::monthly_spending(&conn, cat, 2024, 3).unwrap(), dec("100"));
    assert_eq!(budget::monthly_spending(&conn, cat, 2024, 2).unwrap(), dec("100"));
    assert_eq!(budget::monthly_spending(&conn, cat, 2024, 1).unwrap(), dec("0"));
}

#[test]
fn deleted_transactions_do_not_count() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);

    let id = expense(&mut conn, w, cat, "100", "2024-03-05");
    expense(&mut conn, w, cat, "40", "2024-03-06");
    lifecycle::delete(&mut conn, id).unwrap();

    assert_eq!(budget::monthly_spending(&conn, cat, 2024, 3).unwrap(), dec("40"));
}

#[test]
fn exceeded_utilization_and_remaining_line_up() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", Some("500"));
    let today = d("2024-03-15");

    expense(&mut conn, w, cat, "250", "2024-03-10");
    assert!(!budget::is_budget_exceeded(&conn, cat, today).unwrap());
    assert_eq!(budget::budget_utilization(&conn, cat, today).unwrap(), dec("50"));
    assert_eq!(budget::remaining_budget(&conn, cat, today).unwrap(), dec("250"));

    expense(&mut conn, w, cat, "350", "2024-03-12");
    assert!(budget::is_budget_exceeded(&conn, cat, today).unwrap());
    assert_eq!(budget::budget_utilization(&conn, cat, today).unwrap(), dec("120"));
    // Remaining never goes negative.
    assert_eq!(budget::remaining_budget(&conn, cat, today).unwrap(), dec("0"));
}

#[test]
fn utilization_is_monotonic_in_spending() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", Some("300"));
    let today = d("2024-03-15");

    let mut last = dec("0");
    for _ in 0..5 {
        expense(&mut conn, w, cat, "45", "2024-03-10");
        let util = budget::budget_utilization(&conn, cat, today).unwrap();
        assert!(util >= last);
        last = util;
    }
}

#[test]
fn no_limit_means_never_exceeded_and_zero_utilization() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);
    let today = d("2024-03-15");

    expense(&mut conn, w, cat, "1000", "2024-03-10");
    assert!(!budget::is_budget_exceeded(&conn, cat, today).unwrap());
    assert_eq!(budget::budget_utilization(&conn, cat, today).unwrap(), dec("0"));
    assert_eq!(budget::remaining_budget(&conn, cat, today).unwrap(), dec("0"));
}

#[test]
fn trend_compares_against_the_previous_month() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);
    let today = d("2024-03-15");

    expense(&mut conn, w, cat, "100", "2024-02-10");
    expense(&mut conn, w, cat, "150", "2024-03-10");

    let trend = budget::spending_trend(&conn, cat, today).unwrap();
    assert_eq!(trend.previous, dec("100"));
    assert_eq!(trend.current, dec("150"));
    assert_eq!(trend.change, dec("50"));
    assert_eq!(trend.change_pct, dec("50"));
    assert_eq!(trend.direction, TrendDirection::Up);
}

#[test]
fn trend_from_a_zero_previous_month_reports_zero_percent() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);
    let today = d("2024-03-15");

    expense(&mut conn, w, cat, "75", "2024-03-10");
    let trend = budget::spending_trend(&conn, cat, today).unwrap();
    assert_eq!(trend.previous, dec("0"));
    assert_eq!(trend.change, dec("75"));
    assert_eq!(trend.change_pct, dec("0"));
    assert_eq!(trend.direction, TrendDirection::Up);
}

#[test]
fn trend_is_stable_when_months_match_and_spans_year_boundaries() {
    let mut conn = setup();
    let w = add_wallet(&conn);
    let cat = add_category(&conn, "Dining", "expense", None);

    expense(&mut conn, w, cat, "80", "2023-12-10");
    expense(&mut conn, w, cat, "80", "2024-01-10");

    // January's previous month is December of the prior year.
    let trend = budget::spending_trend(&conn, cat, d("2024-01-20")).unwrap();
    assert_eq!(trend.previous, dec("80"));
    assert_eq!(trend.current, dec("80"));
    assert_eq!(trend.direction, TrendDirection::Stable);

    let trend = budget::spending_trend(&conn, cat, d("2024-02-20")).unwrap();
    assert_eq!(trend.direction, TrendDirection::Down);
    assert_eq!(trend.change, dec("-80"));
    assert_eq!(trend.change_pct, dec("-100"));
}
