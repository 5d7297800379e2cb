// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User-scoped access to the document store.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::store::{DocumentStore, Snapshot};
use crate::error::Result;

pub const TRANSACTIONS: &str = "transactions";
pub const LOANS: &str = "loans";
pub const SAVING_GOALS: &str = "savingGoals";
pub const SAVINGS_ACCOUNTS: &str = "savingsAccounts";

/// Natural sort key of each collection.
pub const TRANSACTIONS_ORDER: &str = "createdAt";
pub const LOANS_ORDER: &str = "endDate";
pub const SAVING_GOALS_ORDER: &str = "targetAmount";
pub const SAVINGS_ACCOUNTS_ORDER: &str = "name";

/// Collection and document paths under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPaths {
    root: String,
}

impl UserPaths {
    pub fn new(user_id: &str) -> Self {
        Self {
            root: format!("users/{user_id}"),
        }
    }

    pub fn collection(&self, name: &str) -> String {
        format!("{}/{}", self.root, name)
    }

    pub fn transactions(&self) -> String {
        self.collection(TRANSACTIONS)
    }

    pub fn loans(&self) -> String {
        self.collection(LOANS)
    }

    pub fn saving_goals(&self) -> String {
        self.collection(SAVING_GOALS)
    }

    pub fn savings_accounts(&self) -> String {
        self.collection(SAVINGS_ACCOUNTS)
    }

    pub fn transaction(&self, id: &str) -> String {
        format!("{}/{}", self.transactions(), id)
    }

    pub fn loan(&self, id: &str) -> String {
        format!("{}/{}", self.loans(), id)
    }

    pub fn saving_goal(&self, id: &str) -> String {
        format!("{}/{}", self.saving_goals(), id)
    }

    pub fn savings_account(&self, id: &str) -> String {
        format!("{}/{}", self.savings_accounts(), id)
    }
}

/// A signed-in user's view of the store, plus the clock the engines run on.
#[derive(Clone)]
pub struct Session {
    pub store: Arc<dyn DocumentStore>,
    pub paths: UserPaths,
    pub clock: Arc<dyn Clock>,
}

impl Session {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            paths: UserPaths::new(user_id),
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn fetch_transactions(&self) -> Result<Snapshot> {
        self.store
            .fetch(&self.paths.transactions(), TRANSACTIONS_ORDER)
    }

    pub fn fetch_loans(&self) -> Result<Snapshot> {
        self.store.fetch(&self.paths.loans(), LOANS_ORDER)
    }

    pub fn fetch_saving_goals(&self) -> Result<Snapshot> {
        self.store
            .fetch(&self.paths.saving_goals(), SAVING_GOALS_ORDER)
    }

    pub fn fetch_savings_accounts(&self) -> Result<Snapshot> {
        self.store
            .fetch(&self.paths.savings_accounts(), SAVINGS_ACCOUNTS_ORDER)
    }
}
