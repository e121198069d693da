// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring transaction generator. An external scheduler runs this once a
//! day (or however often); each due template spawns one instance through the
//! regular lifecycle hook and has its schedule advanced. Templates fail in
//! isolation: one overdrawn wallet never blocks the rest of the batch.

use chrono::{Days, Months, NaiveDate};
use rusqlite::{params, Connection};

use super::error::LedgerError;
use super::lifecycle::{self, NewTransaction};
use super::notify::Notification;
use super::store;
use super::wallet;
use crate::models::{RecurringFrequency, Transaction, TransactionKind};

#[derive(Debug, Default)]
pub struct GenerationReport {
    pub created: usize,
    pub failed: usize,
    pub previews: Vec<String>,
    pub errors: Vec<String>,
    pub notifications: Vec<Notification>,
}

pub fn run(
    conn: &mut Connection,
    today: NaiveDate,
    dry_run: bool,
) -> Result<GenerationReport, LedgerError> {
    let templates = store::due_templates(conn, today)?;
    let mut report = GenerationReport::default();

    if dry_run {
        for template in &templates {
            report.previews.push(preview_line(conn, template, today)?);
        }
        return Ok(report);
    }

    let mut tx = conn.transaction()?;
    for template in &templates {
        let sp = tx.savepoint()?;
        match generate_one(&sp, template, today) {
            Ok(mut notifications) => {
                sp.commit()?;
                report.created += 1;
                report.notifications.append(&mut notifications);
            }
            Err(err) => {
                // Savepoint rolls back on drop; the template is untouched.
                drop(sp);
                report.failed += 1;
                report
                    .errors
                    .push(format!("template {}: {}", template.id, err));
            }
        }
    }
    tx.commit()?;
    Ok(report)
}

fn generate_one(
    conn: &Connection,
    template: &Transaction,
    today: NaiveDate,
) -> Result<Vec<Notification>, LedgerError> {
    precheck_funds(conn, template)?;

    let spawned = NewTransaction {
        user_id: template.user_id,
        amount: template.amount,
        kind: template.kind,
        description: template.description.clone(),
        date: today,
        category_id: template.category_id,
        wallet_id: template.wallet_id,
        from_wallet_id: template.from_wallet_id,
        to_wallet_id: template.to_wallet_id,
        reference: None,
        tags: template.tags.clone(),
        notes: template.notes.clone(),
        receipt_path: None,
        recurring: None,
        parent_transaction_id: Some(template.id),
    };
    let (child_id, mut notifications) = lifecycle::create_in(conn, &spawned, today)?;

    let due = template
        .next_occurrence
        .ok_or_else(|| LedgerError::validation("recurring template has no next occurrence"))?;
    let advanced = advance(due, template.recurring_frequency)?;

    // Compare-and-swap claim: only the run that still sees the old schedule
    // gets to keep its generated instance. Zero rows means another run
    // already claimed this due date.
    let claimed = conn.execute(
        "UPDATE transactions SET next_occurrence=?1
         WHERE id=?2 AND is_recurring=1 AND next_occurrence=?3",
        params![advanced.to_string(), template.id, due.to_string()],
    )?;
    if claimed == 0 {
        return Err(LedgerError::validation(
            "schedule already advanced by a concurrent run",
        ));
    }

    let reference: String = conn.query_row(
        "SELECT reference FROM transactions WHERE id=?1",
        params![child_id],
        |r| r.get(0),
    )?;
    notifications.push(Notification::RecurringGenerated {
        template_id: template.id,
        transaction_id: child_id,
        reference,
    });
    Ok(notifications)
}

fn precheck_funds(conn: &Connection, template: &Transaction) -> Result<(), LedgerError> {
    match template.kind {
        TransactionKind::Expense => {
            if let Some(wallet_id) = template.wallet_id {
                wallet::check_funds(conn, wallet_id, template.amount)?;
            }
        }
        TransactionKind::Transfer => {
            if let Some(from) = template.from_wallet_id {
                wallet::check_funds(conn, from, template.amount)?;
            }
        }
        TransactionKind::Income => {}
    }
    Ok(())
}

fn preview_line(
    conn: &Connection,
    template: &Transaction,
    today: NaiveDate,
) -> Result<String, LedgerError> {
    let funds = match precheck_funds(conn, template) {
        Ok(()) => String::new(),
        Err(err) => format!(" [would fail: {}]", err),
    };
    Ok(format!(
        "template {} '{}': {} {} on {}{}",
        template.id, template.description, template.kind, template.amount, today, funds
    ))
}

/// Step a schedule date forward by one period. A template with a missing
/// frequency advances by one month.
pub fn advance(
    from: NaiveDate,
    frequency: Option<RecurringFrequency>,
) -> Result<NaiveDate, LedgerError> {
    let next = match frequency {
        Some(RecurringFrequency::Daily) => from.checked_add_days(Days::new(1)),
        Some(RecurringFrequency::Weekly) => from.checked_add_days(Days::new(7)),
        Some(RecurringFrequency::Monthly) | None => from.checked_add_months(Months::new(1)),
        Some(RecurringFrequency::Quarterly) => from.checked_add_months(Months::new(3)),
        Some(RecurringFrequency::Semiannually) => from.checked_add_months(Months::new(6)),
        Some(RecurringFrequency::Yearly) => from.checked_add_months(Months::new(12)),
    };
    next.ok_or_else(|| LedgerError::validation(format!("cannot advance schedule past {}", from)))
}
