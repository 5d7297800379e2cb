// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::controller::{ControllerSettings, DashboardView, run_once};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_month, parse_opt, pretty_table};
use anyhow::Result;

pub fn handle(session: &Session, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let month = parse_opt(m, "month", parse_month)?;
    let view = run_once(session, &ControllerSettings::from(settings), month)?;
    if !maybe_print_json(m.get_flag("json"), &view)? {
        print_view(&view, &settings.currency);
    }
    Ok(())
}

fn print_view(view: &DashboardView, ccy: &str) {
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|m| {
            if *m == view.selected_month {
                format!("[{}]", m)
            } else {
                m.to_string()
            }
        })
        .collect();
    println!("{}", tabs.join(" "));
    println!();

    println!(
        "{}",
        pretty_table(
            &["Income", "Expenses", "Net"],
            vec![vec![
                fmt_money(&view.totals.income, ccy),
                fmt_money(&view.totals.expenses, ccy),
                fmt_money(&view.totals.net, ccy),
            ]],
        )
    );

    if !view.transactions.is_empty() {
        let rows = view
            .transactions
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    fmt_money(&t.amount, ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Type", "Description", "Category", "Amount"], rows)
        );
    }

    if !view.expense_by_category.is_empty() {
        let rows = view
            .expense_by_category
            .iter()
            .map(|c| vec![c.category.clone(), fmt_money(&c.amount, ccy)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }

    if !view.loans.is_empty() {
        let rows = view
            .loans
            .iter()
            .map(|l| {
                vec![
                    l.name.clone(),
                    fmt_money(&l.paid_amount, ccy),
                    fmt_money(&l.total_amount, ccy),
                    format!("{}%", l.progress_percent()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Loan", "Paid", "Total", "Progress"], rows)
        );
    }

    if !view.saving_goals.is_empty() {
        let rows = view
            .saving_goals
            .iter()
            .map(|g| {
                vec![
                    g.name.clone(),
                    fmt_money(&g.saved_amount, ccy),
                    fmt_money(&g.target_amount, ccy),
                    format!("{}%", g.progress_percent()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Goal", "Saved", "Target", "Progress"], rows)
        );
    }

    println!("Total savings: {}", fmt_money(&view.total_savings, ccy));
}
