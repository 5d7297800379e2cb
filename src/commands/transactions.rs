// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::actions::{self, TransactionEdit, TransactionInput};
use crate::config::Settings;
use crate::models::{Transaction, TransactionType};
use crate::session::Session;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, parse_opt, pretty_table,
    required,
};
use anyhow::{Result, anyhow};

pub fn handle(session: &Session, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, settings, sub)?,
        Some(("list", sub)) => list(session, settings, sub)?,
        Some(("edit", sub)) => edit(session, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            actions::delete_transaction(session, id)?;
            println!("Removed transaction {}", id);
        }
        Some(("categories", sub)) => categories(sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_type(s: &str) -> Result<TransactionType> {
    s.parse::<TransactionType>().map_err(|e| anyhow!(e))
}

fn add(session: &Session, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let input = TransactionInput {
        kind: parse_type(required(sub, "type")?)?,
        description: required(sub, "description")?.to_string(),
        amount: parse_decimal(required(sub, "amount")?)?,
        category: required(sub, "category")?.to_string(),
        date: parse_opt(sub, "date", parse_date)?,
    };
    let id = actions::add_transaction(session, input.clone())?;
    println!(
        "Recorded {} {} '{}' ({}) as {}",
        input.kind,
        fmt_money(&input.amount, &settings.currency),
        input.description,
        input.category,
        id
    );
    Ok(())
}

fn list(session: &Session, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    fmt_money(&t.amount, &settings.currency),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Description", "Category", "Amount"],
                rows
            )
        );
    }
    Ok(())
}

/// Transactions newest first, optionally narrowed to `--month` and cut to
/// `--limit`.
pub fn query_rows(session: &Session, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let month = parse_opt(sub, "month", parse_month)?;
    let mut data: Vec<Transaction> = session.fetch_transactions()?.decode();
    data.reverse();
    if let Some(month) = month {
        data.retain(|t| month.contains(t.date));
    }
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn edit(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let current = actions::find_transaction(session, required(sub, "id")?)?;
    let edit = TransactionEdit {
        kind: parse_opt(sub, "type", parse_type)?,
        description: sub.get_one::<String>("description").cloned(),
        amount: parse_opt(sub, "amount", parse_decimal)?,
        category: sub.get_one::<String>("category").cloned(),
    };
    actions::edit_transaction(session, &current, edit)?;
    println!("Updated transaction {}", current.id);
    Ok(())
}

fn categories(sub: &clap::ArgMatches) -> Result<()> {
    let kinds = match parse_opt(sub, "type", parse_type)? {
        Some(kind) => vec![kind],
        None => vec![TransactionType::Income, TransactionType::Expense],
    };
    let rows = kinds
        .into_iter()
        .flat_map(|kind| {
            kind.categories()
                .iter()
                .map(move |c| vec![kind.to_string(), c.to_string()])
        })
        .collect();
    println!("{}", pretty_table(&["Type", "Category"], rows));
    Ok(())
}
