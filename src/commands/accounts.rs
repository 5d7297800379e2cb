// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::actions::{self, Adjustment};
use crate::config::Settings;
use crate::models::{NewSavingsAccount, SavingsAccount};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table, required};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(session: &Session, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let ccy = &settings.currency;
    match m.subcommand() {
        Some(("add", sub)) => {
            let account = NewSavingsAccount {
                name: required(sub, "name")?.to_string(),
                amount: parse_decimal(required(sub, "amount")?)?,
            };
            let name = account.name.clone();
            let id = actions::add_savings_account(session, account)?;
            println!("Added savings account '{}' as {}", name.trim(), id);
        }
        Some((op @ ("deposit" | "withdraw"), sub)) => {
            let adjustment = if op == "deposit" {
                Adjustment::Deposit
            } else {
                Adjustment::Withdraw
            };
            let account = actions::find_savings_account(session, required(sub, "id")?)?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let balance = actions::adjust_savings_account(session, &account, adjustment, amount)?;
            println!("'{}' balance: {}", account.name, fmt_money(&balance, ccy));
        }
        Some(("rename", sub)) => {
            let id = required(sub, "id")?;
            actions::rename_savings_account(session, id, required(sub, "name")?)?;
            println!("Renamed savings account {}", id);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            actions::delete_savings_account(session, id)?;
            println!("Removed savings account {}", id);
        }
        Some(("list", sub)) => {
            let data: Vec<SavingsAccount> = session.fetch_savings_accounts()?.decode();
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let total: Decimal = data.iter().map(|a| a.amount).sum();
                let mut rows: Vec<Vec<String>> = data
                    .iter()
                    .map(|a| vec![a.id.clone(), a.name.clone(), fmt_money(&a.amount, ccy)])
                    .collect();
                rows.push(vec![String::new(), "Total".into(), fmt_money(&total, ccy)]);
                println!("{}", pretty_table(&["Id", "Name", "Balance"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
