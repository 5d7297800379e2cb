// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use cuentas::actions::{self, TransactionInput};
use cuentas::clock::FixedClock;
use cuentas::commands::{loans, transactions};
use cuentas::config::{ENV_DB, ENV_USER, Settings};
use cuentas::models::{NewLoan, TransactionType};
use cuentas::session::Session;
use cuentas::store::SqliteStore;
use cuentas::{cli, utils};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Session {
    let session = Session::new(
        Arc::new(SqliteStore::open_in_memory().unwrap()),
        "local",
        Arc::new(FixedClock(d(2025, 1, 20))),
    );
    for (i, date) in [d(2024, 12, 30), d(2025, 1, 2), d(2025, 1, 3), d(2025, 1, 4)]
        .into_iter()
        .enumerate()
    {
        actions::add_transaction(
            &session,
            TransactionInput {
                kind: TransactionType::Expense,
                description: format!("Coffee {i}"),
                amount: dec("3.20"),
                category: "Food".into(),
                date: Some(date),
            },
        )
        .unwrap();
    }
    session
}

fn sub_matches<'a>(
    matches: &'a clap::ArgMatches,
    group: &str,
    command: &str,
) -> &'a clap::ArgMatches {
    match matches.subcommand() {
        Some((g, m)) if g == group => match m.subcommand() {
            Some((c, sub)) if c == command => sub,
            _ => panic!("no {command} subcommand"),
        },
        _ => panic!("no {group} subcommand"),
    }
}

#[test]
fn list_month_and_limit_respected() {
    let session = setup();
    let matches = cli::build_cli().get_matches_from([
        "cuentas", "tx", "list", "--month", "2025-01", "--limit", "2",
    ]);
    let rows = transactions::query_rows(&session, sub_matches(&matches, "tx", "list")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, d(2025, 1, 4));
    assert_eq!(rows[1].date, d(2025, 1, 3));
}

#[test]
fn list_rejects_bad_month() {
    let session = setup();
    let matches =
        cli::build_cli().get_matches_from(["cuentas", "tx", "list", "--month", "2025-1"]);
    assert!(transactions::query_rows(&session, sub_matches(&matches, "tx", "list")).is_err());
}

#[test]
fn loan_list_projects_future_months() {
    let session = setup();
    actions::add_loan(
        &session,
        NewLoan {
            name: "Laptop".into(),
            total_amount: dec("600"),
            start_date: d(2024, 10, 1),
            end_date: d(2025, 9, 1),
            monthly_payment: dec("50"),
        },
    )
    .unwrap();

    let matches = cli::build_cli().get_matches_from(["cuentas", "loan", "list"]);
    let rows = loans::query_rows(&session, sub_matches(&matches, "loan", "list")).unwrap();
    // Nov, Dec and Jan are due by 2025-01-20.
    assert_eq!(rows[0].paid_amount, dec("150"));

    let matches =
        cli::build_cli().get_matches_from(["cuentas", "loan", "list", "--month", "2025-04"]);
    let rows = loans::query_rows(&session, sub_matches(&matches, "loan", "list")).unwrap();
    assert_eq!(rows[0].paid_amount, dec("300"));
}

#[test]
fn global_flags_parse_after_subcommand() {
    let matches = cli::build_cli().get_matches_from([
        "cuentas",
        "dashboard",
        "--month",
        "2025-02",
        "--json",
        "--user",
        "alice",
        "--db",
        "/tmp/x.sqlite",
    ]);
    let Some(("dashboard", sub)) = matches.subcommand() else {
        panic!("no dashboard subcommand");
    };
    assert!(sub.get_flag("json"));
    assert_eq!(sub.get_one::<String>("user").map(String::as_str), Some("alice"));
    assert_eq!(matches.get_one::<String>("db").map(String::as_str), Some("/tmp/x.sqlite"));
}

#[test]
fn tx_add_requires_known_type() {
    let res = cli::build_cli().try_get_matches_from([
        "cuentas", "tx", "add", "--type", "transfer", "--desc", "x", "--amount", "1",
        "--category", "Food",
    ]);
    assert!(res.is_err());
}

#[test]
fn settings_file_and_env_layering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"userId": "bob", "loanDebounceMs": 250}"#).unwrap();

    let mut settings = Settings::load(&path).unwrap();
    assert_eq!(settings.user_id, "bob");
    assert_eq!(settings.loan_debounce_ms, 250);
    assert_eq!(settings.tabs_before, 6);
    assert_eq!(settings.currency, "EUR");

    settings.apply_env(|key| match key {
        k if k == ENV_USER => Some("carol".to_string()),
        k if k == ENV_DB => Some("  ".to_string()),
        _ => None,
    });
    assert_eq!(settings.user_id, "carol");
    assert_eq!(settings.database, None);

    assert!(Settings::load(Path::new("/definitely/missing.json")).is_err());
}

#[test]
fn parse_helpers() {
    assert_eq!(utils::parse_date("2025-01-31").unwrap(), d(2025, 1, 31));
    assert!(utils::parse_date("31/01/2025").is_err());
    assert_eq!(utils::parse_month("2025-01").unwrap().to_string(), "2025-01");
    assert_eq!(utils::fmt_money(&dec("12.345"), "EUR"), "EUR 12.34");
}
