// Copyright (c) 2025 Pocketledger.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .value_name("USER_ID")
        .default_value("1")
        .help("Owner user id")
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .about("Wallet bookkeeping, monthly budgets, and recurring transactions")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("wallet")
                .about("Manage wallets")
                .subcommand(
                    Command::new("add")
                        .about("Add a wallet")
                        .arg(user_arg())
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("bank_account")
                                .help("bank_account|cash|credit_card|savings|investment|other"),
                        )
                        .arg(Arg::new("currency").long("currency").default_value("USD"))
                        .arg(
                            Arg::new("initial")
                                .long("initial")
                                .default_value("0")
                                .help("Opening balance"),
                        ),
                )
                .subcommand(Command::new("list").about("List wallets").arg(user_arg()))
                .subcommand(
                    Command::new("set-initial")
                        .about("Edit a wallet's opening balance, shifting its current balance")
                        .arg(user_arg())
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(user_arg())
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .help("income|expense"),
                        )
                        .arg(Arg::new("parent").long("parent").help("Parent category name"))
                        .arg(
                            Arg::new("budget")
                                .long("budget")
                                .help("Monthly budget limit"),
                        ),
                )
                .subcommand(Command::new("list").about("List categories").arg(user_arg()))
                .subcommand(
                    Command::new("set-budget")
                        .about("Set or clear a category's monthly budget limit")
                        .arg(user_arg())
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("limit").long("limit").help("Monthly limit"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .help("Remove the limit"),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(user_arg())
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income|expense|transfer"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .required(true),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(Arg::new("wallet").long("wallet").help("Wallet name (income/expense)"))
                        .arg(Arg::new("from").long("from").help("Source wallet (transfer)"))
                        .arg(Arg::new("to").long("to").help("Destination wallet (transfer)"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("reference").long("reference"))
                        .arg(Arg::new("tags").long("tags"))
                        .arg(Arg::new("notes").long("notes"))
                        .arg(Arg::new("receipt").long("receipt").help("Receipt file path"))
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .help("Mark as recurring template: daily|weekly|monthly|quarterly|semiannually|yearly"),
                        )
                        .arg(
                            Arg::new("next")
                                .long("next")
                                .help("First occurrence date for a recurring template"),
                        ),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Edit a transaction (balances are reversed and reapplied)")
                        .arg(user_arg())
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("wallet").long("wallet"))
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("tags").long("tags"))
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction (kept on record, balances restored)")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(user_arg())
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("wallet").long("wallet"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("budget").about("Budget reports").subcommand(json_flags(
                Command::new("report")
                    .about("Per-category spending, limits, utilization, and trend")
                    .arg(user_arg())
                    .arg(Arg::new("month").long("month").help("YYYY-MM, default current")),
            )),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring transaction templates")
                .subcommand(
                    Command::new("run")
                        .about("Generate instances for all due templates")
                        .arg(
                            Arg::new("dry-run")
                                .long("dry-run")
                                .action(ArgAction::SetTrue)
                                .help("Preview without writing"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("Treat this date as today (YYYY-MM-DD)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Export transactions to a file")
                    .arg(user_arg())
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check every wallet balance against the transaction log"),
        )
}
