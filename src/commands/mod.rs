// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod wallets;
pub mod categories;
pub mod transactions;
pub mod budgets;
pub mod recurring;
pub mod exporter;
pub mod doctor;

use anyhow::{Context, Result};

pub(crate) fn user_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("user").unwrap();
    raw.parse::<i64>()
        .with_context(|| format!("Invalid user id '{}'", raw))
}
