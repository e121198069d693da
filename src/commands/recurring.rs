// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::recurring;
use crate::utils::parse_date;
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("run", sub)) => run(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let dry_run = sub.get_flag("dry-run");
    let today = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };

    let report = recurring::run(conn, today, dry_run)?;

    if dry_run {
        if report.previews.is_empty() {
            println!("No templates due on {}", today);
        }
        for line in &report.previews {
            println!("would generate: {}", line);
        }
        return Ok(());
    }

    for n in &report.notifications {
        println!("{}", n.describe());
    }
    for err in &report.errors {
        eprintln!("failed: {}", err);
    }
    println!(
        "Recurring run for {}: {} generated, {} failed",
        today, report.created, report.failed
    );
    Ok(())
}
