// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard controller.
//!
//! Owns typed caches of the user's collections and the selected month, and
//! reacts to snapshot and navigation events by running the amortization,
//! projection and duplication engines.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::Settings;
use crate::engine::amortization::apply_due_payments;
use crate::engine::duplicator::{self, DuplicationGuard};
use crate::engine::projection::project_all;
use crate::error::Result;
use crate::models::{Loan, SavingGoal, SavingsAccount, Transaction, TransactionType};
use crate::month::Month;
use crate::session::{
    LOANS_ORDER, SAVING_GOALS_ORDER, SAVINGS_ACCOUNTS_ORDER, Session, TRANSACTIONS_ORDER,
};
use crate::store::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashflowTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub selected_month: Month,
    pub tabs: Vec<Month>,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub totals: CashflowTotals,
    pub expense_by_category: Vec<CategoryTotal>,
    /// Projected to the selected month.
    pub loans: Vec<Loan>,
    pub saving_goals: Vec<SavingGoal>,
    pub savings_accounts: Vec<SavingsAccount>,
    pub total_savings: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub loan_debounce: Duration,
    pub tabs_before: u32,
    pub tabs_after: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ControllerSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            loan_debounce: settings.loan_debounce(),
            tabs_before: settings.tabs_before,
            tabs_after: settings.tabs_after,
        }
    }
}

/// Typed collection caches plus the selected month.
#[derive(Debug, Clone)]
pub struct DashboardState {
    selected: Month,
    transactions: Vec<Transaction>,
    loans: Vec<Loan>,
    saving_goals: Vec<SavingGoal>,
    savings_accounts: Vec<SavingsAccount>,
}

impl DashboardState {
    pub fn new(selected: Month) -> Self {
        Self {
            selected,
            transactions: Vec::new(),
            loans: Vec::new(),
            saving_goals: Vec::new(),
            savings_accounts: Vec::new(),
        }
    }

    /// Snapshots arrive oldest first; the dashboard lists newest first.
    pub fn set_transactions(&mut self, snapshot: &Snapshot) {
        let mut txs = snapshot.decode::<Transaction>();
        txs.reverse();
        self.transactions = txs;
    }

    pub fn set_loans(&mut self, snapshot: &Snapshot) {
        self.loans = snapshot.decode();
    }

    pub fn set_saving_goals(&mut self, snapshot: &Snapshot) {
        self.saving_goals = snapshot.decode();
    }

    pub fn set_savings_accounts(&mut self, snapshot: &Snapshot) {
        self.savings_accounts = snapshot.decode();
    }

    pub fn select_month(&mut self, month: Month) {
        self.selected = month;
    }

    pub fn selected_month(&self) -> Month {
        self.selected
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn transactions_in(&self, month: Month) -> Vec<Transaction> {
        let prefix = month.to_string();
        self.transactions
            .iter()
            .filter(|t| t.date.to_string().starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn month_transactions(&self) -> Vec<Transaction> {
        self.transactions_in(self.selected)
    }

    pub fn totals(&self) -> CashflowTotals {
        let mut totals = CashflowTotals::default();
        for tx in self.month_transactions() {
            match tx.kind {
                TransactionType::Income => totals.income += tx.amount,
                TransactionType::Expense => totals.expenses += tx.amount,
            }
        }
        totals.net = totals.income - totals.expenses;
        totals
    }

    /// Largest category first.
    pub fn expense_by_category(&self) -> Vec<CategoryTotal> {
        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for tx in self.month_transactions() {
            if tx.kind == TransactionType::Expense {
                *by_category.entry(tx.category).or_default() += tx.amount;
            }
        }
        let mut totals: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect();
        totals.sort_by(|a, b| b.amount.cmp(&a.amount));
        totals
    }

    pub fn projected_loans(&self, today: NaiveDate) -> Vec<Loan> {
        let offset = self.selected.offset_from(Month::of(today));
        project_all(&self.loans, offset, today)
    }

    /// The previous month's transactions, when the selected month should be
    /// filled from them.
    pub fn duplication_source(&self, today: NaiveDate) -> Option<Vec<Transaction>> {
        let target = self.selected;
        let previous = self.transactions_in(target.pred());
        let target_count = self.transactions_in(target).len();
        duplicator::needs_duplication(target, today, target_count, previous.len())
            .then_some(previous)
    }

    pub fn view(&self, today: NaiveDate, settings: &ControllerSettings) -> DashboardView {
        DashboardView {
            selected_month: self.selected,
            tabs: Month::tabs(Month::of(today), settings.tabs_before, settings.tabs_after),
            transactions: self.month_transactions(),
            totals: self.totals(),
            expense_by_category: self.expense_by_category(),
            loans: self.projected_loans(today),
            saving_goals: self.saving_goals.clone(),
            savings_accounts: self.savings_accounts.clone(),
            total_savings: self.savings_accounts.iter().map(|a| a.amount).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectMonth(Month),
    Shutdown,
}

pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<DashboardView>,
    task: JoinHandle<Result<()>>,
}

impl DashboardHandle {
    pub async fn select_month(&self, month: Month) -> bool {
        self.commands.send(Command::SelectMonth(month)).await.is_ok()
    }

    pub fn views(&self) -> watch::Receiver<DashboardView> {
        self.views.clone()
    }

    pub fn current(&self) -> DashboardView {
        self.views.borrow().clone()
    }

    /// Stops the controller and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.commands.send(Command::Shutdown).await;
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("dashboard task did not finish cleanly: {e}");
                Ok(())
            }
        }
    }
}

pub struct Controller {
    session: Session,
    settings: ControllerSettings,
    guard: DuplicationGuard,
}

struct Subscriptions {
    transactions: watch::Receiver<Snapshot>,
    loans: watch::Receiver<Snapshot>,
    saving_goals: watch::Receiver<Snapshot>,
    savings_accounts: watch::Receiver<Snapshot>,
}

impl Controller {
    pub fn new(session: Session, settings: ControllerSettings) -> Self {
        Self {
            session,
            settings,
            guard: DuplicationGuard::new(),
        }
    }

    pub fn guard(&self) -> &DuplicationGuard {
        &self.guard
    }

    /// Subscribes to every collection and starts the event loop on the
    /// current tokio runtime.
    pub fn spawn(self) -> Result<DashboardHandle> {
        let paths = &self.session.paths;
        let store = &self.session.store;
        let subs = Subscriptions {
            transactions: store.subscribe(&paths.transactions(), TRANSACTIONS_ORDER)?,
            loans: store.subscribe(&paths.loans(), LOANS_ORDER)?,
            saving_goals: store.subscribe(&paths.saving_goals(), SAVING_GOALS_ORDER)?,
            savings_accounts: store
                .subscribe(&paths.savings_accounts(), SAVINGS_ACCOUNTS_ORDER)?,
        };

        let today = self.session.today();
        let mut state = DashboardState::new(Month::of(today));
        state.set_transactions(&subs.transactions.borrow());
        state.set_loans(&subs.loans.borrow());
        state.set_saving_goals(&subs.saving_goals.borrow());
        state.set_savings_accounts(&subs.savings_accounts.borrow());

        let (views_tx, views_rx) = watch::channel(state.view(today, &self.settings));
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let task = tokio::spawn(self.run(state, subs, commands_rx, views_tx));

        Ok(DashboardHandle {
            commands: commands_tx,
            views: views_rx,
            task,
        })
    }

    async fn run(
        self,
        mut state: DashboardState,
        mut subs: Subscriptions,
        mut commands: mpsc::Receiver<Command>,
        views: watch::Sender<DashboardView>,
    ) -> Result<()> {
        // The initial loan snapshot counts as a load.
        let mut deadline = Some(Instant::now() + self.settings.loan_debounce);

        loop {
            let debounce = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                changed = subs.transactions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    state.set_transactions(&subs.transactions.borrow_and_update());
                    self.maybe_duplicate(&state);
                }
                changed = subs.loans.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    state.set_loans(&subs.loans.borrow_and_update());
                    deadline = Some(Instant::now() + self.settings.loan_debounce);
                }
                changed = subs.saving_goals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    state.set_saving_goals(&subs.saving_goals.borrow_and_update());
                }
                changed = subs.savings_accounts.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    state.set_savings_accounts(&subs.savings_accounts.borrow_and_update());
                }
                command = commands.recv() => match command {
                    Some(Command::SelectMonth(month)) => {
                        tracing::debug!(%month, "month selected");
                        state.select_month(month);
                        self.maybe_duplicate(&state);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = debounce => {
                    deadline = None;
                    // Failures are retried on the next loan snapshot.
                    if let Err(e) = apply_due_payments(&self.session, state.loans()) {
                        tracing::error!("could not apply automatic loan payments: {e}");
                    }
                }
            }

            views.send_replace(state.view(self.session.today(), &self.settings));
        }

        tracing::debug!("dashboard controller stopped");
        Ok(())
    }

    fn maybe_duplicate(&self, state: &DashboardState) {
        let Some(previous) = state.duplication_source(self.session.today()) else {
            return;
        };
        let Some(permit) = self.guard.try_acquire() else {
            tracing::debug!("duplication already in flight");
            return;
        };

        let store = self.session.store.clone();
        let paths = self.session.paths.clone();
        let target = state.selected_month();
        tokio::task::spawn_blocking(move || {
            duplicator::duplicate_month(store.as_ref(), &paths, &previous, target, permit)
        });
    }
}

/// One synchronous pass: applies due loan payments, fills `month` from the
/// month before when it qualifies, and derives the view.
pub fn run_once(
    session: &Session,
    settings: &ControllerSettings,
    month: Option<Month>,
) -> Result<DashboardView> {
    let today = session.today();
    let mut state = DashboardState::new(month.unwrap_or_else(|| Month::of(today)));

    state.set_loans(&session.fetch_loans()?);
    if apply_due_payments(session, state.loans())? > 0 {
        state.set_loans(&session.fetch_loans()?);
    }

    state.set_transactions(&session.fetch_transactions()?);
    if let Some(previous) = state.duplication_source(today) {
        let guard = DuplicationGuard::new();
        if let Some(permit) = guard.try_acquire() {
            duplicator::duplicate_month(
                session.store.as_ref(),
                &session.paths,
                &previous,
                state.selected_month(),
                permit,
            );
            state.set_transactions(&session.fetch_transactions()?);
        }
    }

    state.set_saving_goals(&session.fetch_saving_goals()?);
    state.set_savings_accounts(&session.fetch_savings_accounts()?);
    Ok(state.view(today, settings))
}
