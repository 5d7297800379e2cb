// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::actions::{self, LoanEdit};
use crate::config::Settings;
use crate::engine::{amortization, projection};
use crate::models::{Loan, NewLoan};
use crate::month::Month;
use crate::session::Session;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, parse_opt, pretty_table,
    required,
};
use anyhow::Result;

pub fn handle(session: &Session, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let loan = NewLoan {
                name: required(sub, "name")?.to_string(),
                total_amount: parse_decimal(required(sub, "total")?)?,
                monthly_payment: parse_decimal(required(sub, "monthly")?)?,
                start_date: parse_date(required(sub, "start")?)?,
                end_date: parse_date(required(sub, "end")?)?,
            };
            let name = loan.name.clone();
            let id = actions::add_loan(session, loan)?;
            println!("Added loan '{}' as {}", name.trim(), id);
        }
        Some(("pay", sub)) => {
            let loan = actions::find_loan(session, required(sub, "id")?)?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let paid = actions::register_loan_payment(session, &loan, amount)?;
            println!(
                "Loan '{}' paid {} of {}",
                loan.name,
                fmt_money(&paid, &settings.currency),
                fmt_money(&loan.total_amount, &settings.currency)
            );
        }
        Some(("edit", sub)) => {
            let loan = actions::find_loan(session, required(sub, "id")?)?;
            let edit = LoanEdit {
                name: sub.get_one::<String>("name").cloned(),
                total_amount: parse_opt(sub, "total", parse_decimal)?,
                monthly_payment: parse_opt(sub, "monthly", parse_decimal)?,
                start_date: parse_opt(sub, "start", parse_date)?,
                end_date: parse_opt(sub, "end", parse_date)?,
            };
            actions::edit_loan(session, &loan, edit)?;
            println!("Updated loan {}", loan.id);
        }
        Some(("list", sub)) => list(session, settings, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            actions::delete_loan(session, id)?;
            println!("Removed loan {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Loans as of `--month`: the stored state for the current month or earlier,
/// a projection for later months. Due automatic payments are applied first.
pub fn query_rows(session: &Session, sub: &clap::ArgMatches) -> Result<Vec<Loan>> {
    let today = session.today();
    let month = parse_opt(sub, "month", parse_month)?.unwrap_or_else(|| Month::of(today));

    let mut loans: Vec<Loan> = session.fetch_loans()?.decode();
    if amortization::apply_due_payments(session, &loans)? > 0 {
        loans = session.fetch_loans()?.decode();
    }
    Ok(projection::project_all(
        &loans,
        month.offset_from(Month::of(today)),
        today,
    ))
}

fn list(session: &Session, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let ccy = &settings.currency;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|l| {
                vec![
                    l.id.clone(),
                    l.name.clone(),
                    fmt_money(&l.paid_amount, ccy),
                    fmt_money(&l.total_amount, ccy),
                    fmt_money(&l.monthly_payment, ccy),
                    format!("{}%", l.progress_percent()),
                    l.start_date.to_string(),
                    l.end_date.to_string(),
                    l.last_payment_process_date
                        .map(|m| m.to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id",
                    "Name",
                    "Paid",
                    "Total",
                    "Monthly",
                    "Progress",
                    "Start",
                    "End",
                    "Processed"
                ],
                rows
            )
        );
    }
    Ok(())
}
