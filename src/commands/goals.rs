// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::actions;
use crate::config::Settings;
use crate::models::{NewSavingGoal, SavingGoal};
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table, required};
use anyhow::Result;

pub fn handle(session: &Session, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let ccy = &settings.currency;
    match m.subcommand() {
        Some(("add", sub)) => {
            let goal = NewSavingGoal {
                name: required(sub, "name")?.to_string(),
                target_amount: parse_decimal(required(sub, "target")?)?,
            };
            let target = goal.target_amount;
            let id = actions::add_saving_goal(session, goal)?;
            println!("Added saving goal of {} as {}", fmt_money(&target, ccy), id);
        }
        Some(("contribute", sub)) => {
            let goal = actions::find_saving_goal(session, required(sub, "id")?)?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let saved = actions::contribute_to_goal(session, &goal, amount)?;
            println!(
                "Goal '{}' at {} of {}",
                goal.name,
                fmt_money(&saved, ccy),
                fmt_money(&goal.target_amount, ccy)
            );
        }
        Some(("list", sub)) => {
            let data: Vec<SavingGoal> = session.fetch_saving_goals()?.decode();
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|g| {
                        vec![
                            g.id.clone(),
                            g.name.clone(),
                            fmt_money(&g.saved_amount, ccy),
                            fmt_money(&g.target_amount, ccy),
                            format!("{}%", g.progress_percent()),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Saved", "Target", "Progress"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
