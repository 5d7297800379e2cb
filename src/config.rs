// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application settings: defaults, then an optional JSON file, then the
//! environment. Command-line flags are applied last by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Cuentas", "cuentas"));

pub const SETTINGS_FILE: &str = "settings.json";
pub const ENV_USER: &str = "CUENTAS_USER";
pub const ENV_DB: &str = "CUENTAS_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub user_id: String,
    pub database: Option<PathBuf>,
    pub loan_debounce_ms: u64,
    pub tabs_before: u32,
    pub tabs_after: u32,
    pub log_filter: String,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            database: None,
            loan_debounce_ms: 1000,
            tabs_before: 6,
            tabs_after: 3,
            log_filter: "warn".to_string(),
            currency: "EUR".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading settings file: {}", path.display()))?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
        Ok(settings)
    }

    /// Explicit file if given, else `settings.json` in the platform config
    /// dir when it exists, else defaults. Environment overrides on top.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_settings_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = var(ENV_USER).filter(|v| !v.trim().is_empty()) {
            self.user_id = user.trim().to_string();
        }
        if let Some(db) = var(ENV_DB).filter(|v| !v.trim().is_empty()) {
            self.database = Some(PathBuf::from(db.trim()));
        }
    }

    pub fn loan_debounce(&self) -> Duration {
        Duration::from_millis(self.loan_debounce_ms)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
}

pub fn default_settings_path() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.config_dir().join(SETTINGS_FILE))
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = project_dirs().context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cuentas.sqlite"))
}
