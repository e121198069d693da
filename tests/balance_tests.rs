// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::db;
use pocketledger::ledger::balance::{self, Effect};
use pocketledger::ledger::wallet::{self, NewWallet};
use pocketledger::ledger::{store, LedgerError};
use pocketledger::models::{TransactionKind, WalletKind};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
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

fn balance_of(conn: &Connection, id: i64) -> Decimal {
    store::get_wallet(conn, id).unwrap().balance
}

#[test]
fn income_increases_and_expense_decreases() {
    let conn = setup();
    let w = add_wallet(&conn, "Main", "1000");

    let deltas = balance::apply(
        &conn,
        Effect {
            kind: TransactionKind::Income,
            amount: dec("250"),
            wallet_id: Some(w),
            from_wallet_id: None,
            to_wallet_id: None,
        },
    )
    .unwrap();
    assert_eq!(deltas.len(), 1);
    assert!(!deltas[0].decreased);
    assert_eq!(balance_of(&conn, w), dec("1250"));

    let deltas = balance::apply(
        &conn,
        Effect {
            kind: TransactionKind::Expense,
            amount: dec("100"),
            wallet_id: Some(w),
            from_wallet_id: None,
            to_wallet_id: None,
        },
    )
    .unwrap();
    assert!(deltas[0].decreased);
    assert_eq!(balance_of(&conn, w), dec("1150"));
}

#[test]
fn transfer_moves_between_wallets() {
    let conn = setup();
    let a = add_wallet(&conn, "A", "1000");
    let b = add_wallet(&conn, "B", "500");

    let effect = Effect {
        kind: TransactionKind::Transfer,
        amount: dec("300"),
        wallet_id: None,
        from_wallet_id: Some(a),
        to_wallet_id: Some(b),
    };
    let deltas = balance::apply(&conn, effect).unwrap();
    assert_eq!(balance_of(&conn, a), dec("700"));
    assert_eq!(balance_of(&conn, b), dec("800"));
    let source = deltas.iter().find(|d| d.wallet_id == a).unwrap();
    assert!(source.decreased);
    let dest = deltas.iter().find(|d| d.wallet_id == b).unwrap();
    assert!(!dest.decreased);
}

#[test]
fn transfer_apply_then_reverse_is_identity() {
    let conn = setup();
    let a = add_wallet(&conn, "A", "1000");
    let b = add_wallet(&conn, "B", "500");

    let effect = Effect {
        kind: TransactionKind::Transfer,
        amount: dec("123.45"),
        wallet_id: None,
        from_wallet_id: Some(a),
        to_wallet_id: Some(b),
    };
    balance::apply(&conn, effect).unwrap();
    balance::reverse(&conn, effect).unwrap();
    assert_eq!(balance_of(&conn, a), dec("1000"));
    assert_eq!(balance_of(&conn, b), dec("500"));
}

#[test]
fn reverse_is_the_algebraic_inverse_for_income_and_expense() {
    let conn = setup();
    let w = add_wallet(&conn, "Main", "42");

    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        let effect = Effect {
            kind,
            amount: dec("17.50"),
            wallet_id: Some(w),
            from_wallet_id: None,
            to_wallet_id: None,
        };
        balance::apply(&conn, effect).unwrap();
        balance::reverse(&conn, effect).unwrap();
        assert_eq!(balance_of(&conn, w), dec("42"));
    }
}

#[test]
fn missing_wallet_is_a_hard_failure() {
    let conn = setup();
    let err = balance::apply(
        &conn,
        Effect {
            kind: TransactionKind::Income,
            amount: dec("10"),
            wallet_id: Some(9999),
            from_wallet_id: None,
            to_wallet_id: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::MissingWallet(9999)));
}

#[test]
fn effect_without_required_wallet_ref_is_rejected() {
    let conn = setup();
    let err = balance::apply(
        &conn,
        Effect {
            kind: TransactionKind::Transfer,
            amount: dec("10"),
            wallet_id: None,
            from_wallet_id: Some(1),
            to_wallet_id: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}
