// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn month_arg() -> Arg {
    Arg::new("month").long("month").help("Month (YYYY-MM)")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Document id")
}

fn amount_arg(required: bool) -> Arg {
    Arg::new("amount").long("amount").required(required)
}

pub fn build_cli() -> Command {
    Command::new("cuentas")
        .about("Personal finance tracker with automatic loan amortization")
        .version(clap::crate_version!())
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Settings file (JSON)"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite database path"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("User id whose records are shown"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("dashboard")
                .about("Monthly overview; applies due loan payments first")
                .arg(month_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("tx")
                .about("Income and expense transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("description").long("desc").required(true))
                        .arg(amount_arg(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("description").long("desc"))
                        .arg(amount_arg(false))
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("categories").arg(
                        Arg::new("type")
                            .long("type")
                            .value_parser(["income", "expense"]),
                    ),
                ),
        )
        .subcommand(
            Command::new("loan")
                .about("Loans and their repayment")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("total").long("total").required(true))
                        .arg(Arg::new("monthly").long("monthly").required(true))
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("end").long("end").required(true)),
                )
                .subcommand(
                    Command::new("pay")
                        .about("Register a manual payment")
                        .arg(id_arg())
                        .arg(amount_arg(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("total").long("total"))
                        .arg(Arg::new("monthly").long("monthly"))
                        .arg(Arg::new("start").long("start"))
                        .arg(Arg::new("end").long("end")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(month_arg().help("Project progress to this month"))
                        .arg(json_flag()),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("goal")
                .about("Saving goals")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("target").long("target").required(true)),
                )
                .subcommand(
                    Command::new("contribute")
                        .arg(id_arg())
                        .arg(amount_arg(true)),
                )
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("account")
                .about("Savings accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(amount_arg(false).default_value("0")),
                )
                .subcommand(
                    Command::new("deposit")
                        .arg(id_arg())
                        .arg(amount_arg(true)),
                )
                .subcommand(
                    Command::new("withdraw")
                        .arg(id_arg())
                        .arg(amount_arg(true)),
                )
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("list").arg(json_flag())),
        )
}
