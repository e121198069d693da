// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction lifecycle hooks: create, update, and soft-delete. Each
//! operation validates first, then runs its balance mutation inside one
//! SQLite transaction, then evaluates alerts. Updates reverse the effect of
//! the prior row state before applying the new one; a delta shortcut would
//! mis-handle type changes that flip the sign or target of the effect.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::{self, Effect, WalletDelta};
use super::budget;
use super::error::LedgerError;
use super::notify::{Notification, LOW_BALANCE_THRESHOLD};
use super::store;
use crate::models::{CategoryKind, RecurringFrequency, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy)]
pub struct RecurringRule {
    pub frequency: RecurringFrequency,
    pub next_occurrence: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub wallet_id: Option<i64>,
    pub from_wallet_id: Option<i64>,
    pub to_wallet_id: Option<i64>,
    pub reference: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub receipt_path: Option<String>,
    pub recurring: Option<RecurringRule>,
    pub parent_transaction_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(
        user_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            amount,
            kind,
            description: description.into(),
            date,
            category_id: None,
            wallet_id: None,
            from_wallet_id: None,
            to_wallet_id: None,
            reference: None,
            tags: None,
            notes: None,
            receipt_path: None,
            recurring: None,
            parent_transaction_id: None,
        }
    }
}

/// Field edits for `update`. Absent fields keep their stored value. When the
/// kind moves between transfer and non-transfer, the now-forbidden wallet and
/// category references are cleared before validation, mirroring what an edit
/// form does when it swaps field sets.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub wallet_id: Option<i64>,
    pub from_wallet_id: Option<i64>,
    pub to_wallet_id: Option<i64>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

pub fn create(
    conn: &mut Connection,
    new: &NewTransaction,
    today: NaiveDate,
) -> Result<(Transaction, Vec<Notification>), LedgerError> {
    let tx = conn.transaction()?;
    let (id, notifications) = create_in(&tx, new, today)?;
    tx.commit()?;
    let created = store::get_transaction(conn, id)?;
    Ok((created, notifications))
}

/// Create inside an existing transaction or savepoint. The recurring
/// generator calls this under its per-template savepoint so generated
/// instances go through exactly the same hook as manual ones.
pub(crate) fn create_in(
    conn: &Connection,
    new: &NewTransaction,
    today: NaiveDate,
) -> Result<(i64, Vec<Notification>), LedgerError> {
    validate(
        conn,
        new.user_id,
        new.kind,
        new.amount,
        new.date,
        new.category_id,
        new.wallet_id,
        new.from_wallet_id,
        new.to_wallet_id,
        today,
    )?;

    let reference = match new.reference.as_deref() {
        Some(r) if !r.trim().is_empty() => r.trim().to_string(),
        _ => generate_reference(new.kind, new.date),
    };

    conn.execute(
        "INSERT INTO transactions(user_id, amount, type, description, date, category_id,
             wallet_id, from_wallet_id, to_wallet_id, reference, tags, notes, receipt_path,
             is_recurring, recurring_frequency, next_occurrence, parent_transaction_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)",
        params![
            new.user_id,
            new.amount.to_string(),
            new.kind.as_str(),
            new.description,
            new.date.to_string(),
            new.category_id,
            new.wallet_id,
            new.from_wallet_id,
            new.to_wallet_id,
            reference,
            new.tags,
            new.notes,
            new.receipt_path,
            new.recurring.is_some(),
            new.recurring.map(|r| r.frequency.as_str()),
            new.recurring.map(|r| r.next_occurrence.to_string()),
            new.parent_transaction_id,
        ],
    )?;
    let id = conn.last_insert_rowid();

    let deltas = balance::apply(
        conn,
        Effect {
            kind: new.kind,
            amount: new.amount,
            wallet_id: new.wallet_id,
            from_wallet_id: new.from_wallet_id,
            to_wallet_id: new.to_wallet_id,
        },
    )?;

    let mut notifications = vec![Notification::TransactionCreated {
        transaction_id: id,
        reference: reference.clone(),
        tx_kind: new.kind,
        amount: new.amount,
    }];
    notifications.extend(post_mutation_alerts(
        conn,
        &deltas,
        new.kind,
        new.category_id,
        today,
    )?);

    Ok((id, notifications))
}

pub fn update(
    conn: &mut Connection,
    id: i64,
    patch: &TransactionPatch,
    today: NaiveDate,
) -> Result<(Transaction, Vec<Notification>), LedgerError> {
    let old = store::get_transaction(conn, id)?;
    if old.deleted {
        return Err(LedgerError::validation(format!(
            "transaction {} is deleted and cannot be edited",
            id
        )));
    }

    let kind = patch.kind.unwrap_or(old.kind);
    let amount = patch.amount.unwrap_or(old.amount);
    let date = patch.date.unwrap_or(old.date);
    let description = patch.description.clone().unwrap_or_else(|| old.description.clone());
    let tags = patch.tags.clone().or_else(|| old.tags.clone());
    let notes = patch.notes.clone().or_else(|| old.notes.clone());

    let (category_id, wallet_id, from_wallet_id, to_wallet_id) = if kind == TransactionKind::Transfer
    {
        (
            None,
            None,
            patch.from_wallet_id.or(old.from_wallet_id),
            patch.to_wallet_id.or(old.to_wallet_id),
        )
    } else {
        (
            patch.category_id.or(old.category_id),
            patch.wallet_id.or(old.wallet_id),
            None,
            None,
        )
    };

    validate(
        conn,
        old.user_id,
        kind,
        amount,
        date,
        category_id,
        wallet_id,
        from_wallet_id,
        to_wallet_id,
        today,
    )?;

    let effect_changed = kind != old.kind
        || amount != old.amount
        || wallet_id != old.wallet_id
        || from_wallet_id != old.from_wallet_id
        || to_wallet_id != old.to_wallet_id;

    let tx = conn.transaction()?;
    let mut notifications = Vec::new();
    if effect_changed {
        // Reverse with the prior row state, then apply the new values.
        balance::reverse(
            &tx,
            Effect {
                kind: old.kind,
                amount: old.amount,
                wallet_id: old.wallet_id,
                from_wallet_id: old.from_wallet_id,
                to_wallet_id: old.to_wallet_id,
            },
        )?;
        let deltas = balance::apply(
            &tx,
            Effect {
                kind,
                amount,
                wallet_id,
                from_wallet_id,
                to_wallet_id,
            },
        )?;
        notifications = post_mutation_alerts(&tx, &deltas, kind, category_id, today)?;
    }

    tx.execute(
        "UPDATE transactions SET amount=?1, type=?2, description=?3, date=?4, category_id=?5,
             wallet_id=?6, from_wallet_id=?7, to_wallet_id=?8, tags=?9, notes=?10
         WHERE id=?11",
        params![
            amount.to_string(),
            kind.as_str(),
            description,
            date.to_string(),
            category_id,
            wallet_id,
            from_wallet_id,
            to_wallet_id,
            tags,
            notes,
            id,
        ],
    )?;
    tx.commit()?;

    let updated = store::get_transaction(conn, id)?;
    Ok((updated, notifications))
}

/// Soft delete: the effect is reversed and the row is kept, excluded from
/// balances and active queries. Deleting twice is a no-op.
pub fn delete(conn: &mut Connection, id: i64) -> Result<(), LedgerError> {
    let old = store::get_transaction(conn, id)?;
    if old.deleted {
        return Ok(());
    }

    let tx = conn.transaction()?;
    balance::reverse(
        &tx,
        Effect {
            kind: old.kind,
            amount: old.amount,
            wallet_id: old.wallet_id,
            from_wallet_id: old.from_wallet_id,
            to_wallet_id: old.to_wallet_id,
        },
    )?;
    tx.execute(
        "UPDATE transactions SET deleted_at=datetime('now') WHERE id=?1",
        params![id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Low-balance and budget-exceeded evaluation, strictly after the balance
/// mutation. Only wallets whose balance decreased are checked for the
/// low-balance threshold.
fn post_mutation_alerts(
    conn: &Connection,
    deltas: &[WalletDelta],
    kind: TransactionKind,
    category_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<Notification>, LedgerError> {
    let mut alerts = Vec::new();
    for delta in deltas {
        if delta.decreased
            && delta.balance > Decimal::ZERO
            && delta.balance <= LOW_BALANCE_THRESHOLD
        {
            let wallet = store::get_wallet(conn, delta.wallet_id)?;
            alerts.push(Notification::LowBalance {
                wallet_id: wallet.id,
                wallet_name: wallet.name,
                balance: delta.balance,
            });
        }
    }
    if kind == TransactionKind::Expense {
        if let Some(category_id) = category_id {
            let category = store::get_category(conn, category_id)?;
            if let Some(limit) = category.budget_limit {
                if limit > Decimal::ZERO && budget::is_budget_exceeded(conn, category_id, today)? {
                    let spent =
                        budget::monthly_spending(conn, category_id, today.year(), today.month())?;
                    alerts.push(Notification::BudgetExceeded {
                        category_id,
                        category_name: category.name,
                        budget_limit: limit,
                        spent,
                    });
                }
            }
        }
    }
    Ok(alerts)
}

#[allow(clippy::too_many_arguments)]
fn validate(
    conn: &Connection,
    user_id: i64,
    kind: TransactionKind,
    amount: Decimal,
    date: NaiveDate,
    category_id: Option<i64>,
    wallet_id: Option<i64>,
    from_wallet_id: Option<i64>,
    to_wallet_id: Option<i64>,
    today: NaiveDate,
) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("amount must be positive"));
    }
    if date > today {
        return Err(LedgerError::validation(format!(
            "date {} is in the future",
            date
        )));
    }

    match kind {
        TransactionKind::Income | TransactionKind::Expense => {
            if from_wallet_id.is_some() || to_wallet_id.is_some() {
                return Err(LedgerError::validation(
                    "from/to wallets are only valid for transfers",
                ));
            }
            let wallet_id =
                wallet_id.ok_or_else(|| LedgerError::validation("wallet is required"))?;
            let wallet = store::get_wallet(conn, wallet_id)?;
            if wallet.user_id != user_id {
                return Err(LedgerError::validation("wallet belongs to another user"));
            }
            let category_id =
                category_id.ok_or_else(|| LedgerError::validation("category is required"))?;
            let category = store::get_category(conn, category_id)?;
            if category.user_id != user_id {
                return Err(LedgerError::validation("category belongs to another user"));
            }
            let expected = match kind {
                TransactionKind::Income => CategoryKind::Income,
                _ => CategoryKind::Expense,
            };
            if category.kind != expected {
                return Err(LedgerError::validation(format!(
                    "category '{}' is an {} category, not usable for {}",
                    category.name, category.kind, kind
                )));
            }
        }
        TransactionKind::Transfer => {
            if wallet_id.is_some() {
                return Err(LedgerError::validation(
                    "transfers use from/to wallets, not a single wallet",
                ));
            }
            if category_id.is_some() {
                return Err(LedgerError::validation("transfers cannot have a category"));
            }
            let from = from_wallet_id
                .ok_or_else(|| LedgerError::validation("source wallet is required"))?;
            let to = to_wallet_id
                .ok_or_else(|| LedgerError::validation("destination wallet is required"))?;
            if from == to {
                return Err(LedgerError::validation(
                    "source and destination wallets must differ",
                ));
            }
            let from_wallet = store::get_wallet(conn, from)?;
            let to_wallet = store::get_wallet(conn, to)?;
            if from_wallet.user_id != user_id || to_wallet.user_id != user_id {
                return Err(LedgerError::validation(
                    "both transfer wallets must belong to the same user",
                ));
            }
        }
    }
    Ok(())
}

fn generate_reference(kind: TransactionKind, date: NaiveDate) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!(
        "{}-{}-{}",
        kind.reference_prefix(),
        date.format("%Y%m%d"),
        suffix
    )
}
