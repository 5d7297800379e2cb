// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use cuentas::clock::SystemClock;
use cuentas::config::Settings;
use cuentas::session::Session;
use cuentas::store::SqliteStore;
use cuentas::{cli, commands, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut settings = Settings::resolve(matches.get_one::<String>("config").map(Path::new))?;
    if let Some(db) = matches.get_one::<String>("db") {
        settings.database = Some(PathBuf::from(db));
    }
    if let Some(user) = matches.get_one::<String>("user") {
        settings.user_id = user.clone();
    }
    logging::init(&settings.log_filter);

    let db_path = settings.database_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Opening database at {}", db_path.display()))?;
    let session = Session::new(Arc::new(store), &settings.user_id, Arc::new(SystemClock));

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db_path.display());
        }
        Some(("dashboard", sub)) => commands::dashboard::handle(&session, &settings, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&session, &settings, sub)?,
        Some(("loan", sub)) => commands::loans::handle(&session, &settings, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&session, &settings, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&session, &settings, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
