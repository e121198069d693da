// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TransactionKind;

/// Wallets at or below this balance (but still positive) trigger a low-balance
/// alert after a decreasing mutation.
pub const LOW_BALANCE_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Alerts produced by the lifecycle hooks and the recurring generator.
///
/// These are values, not deliveries: the caller renders or forwards them as it
/// sees fit, and nothing here can fail in a way that would undo a committed
/// balance mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    TransactionCreated {
        transaction_id: i64,
        reference: String,
        tx_kind: TransactionKind,
        amount: Decimal,
    },
    LowBalance {
        wallet_id: i64,
        wallet_name: String,
        balance: Decimal,
    },
    BudgetExceeded {
        category_id: i64,
        category_name: String,
        budget_limit: Decimal,
        spent: Decimal,
    },
    RecurringGenerated {
        template_id: i64,
        transaction_id: i64,
        reference: String,
    },
}

impl Notification {
    /// One-line human rendering for the CLI.
    pub fn describe(&self) -> String {
        match self {
            Self::TransactionCreated {
                reference,
                tx_kind,
                amount,
                ..
            } => format!("recorded {} {} ({})", tx_kind, amount, reference),
            Self::LowBalance {
                wallet_name,
                balance,
                ..
            } => format!("low balance on '{}': {}", wallet_name, balance),
            Self::BudgetExceeded {
                category_name,
                budget_limit,
                spent,
                ..
            } => format!(
                "budget exceeded for '{}': spent {} of {}",
                category_name, spent, budget_limit
            ),
            Self::RecurringGenerated {
                template_id,
                reference,
                ..
            } => format!("recurring template {} generated {}", template_id, reference),
        }
    }
}
