// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Copies the previous month's transactions into an empty future month.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, NaiveDate};

use crate::models::{NewTransaction, Transaction};
use crate::month::Month;
use crate::session::UserPaths;
use crate::store::{DocId, DocumentStore};

/// True when `target` is after today's month, holds no transactions, and
/// the month before it holds some.
pub fn needs_duplication(
    target: Month,
    today: NaiveDate,
    target_count: usize,
    previous_count: usize,
) -> bool {
    target > Month::of(today) && target_count == 0 && previous_count > 0
}

/// Same day of month in `target`, or its last day when the month is shorter.
pub fn duplicate_date(original: NaiveDate, target: Month) -> NaiveDate {
    target.day(original.day())
}

pub fn build_duplicates(previous: &[Transaction], target: Month) -> Vec<NewTransaction> {
    previous
        .iter()
        .map(|t| NewTransaction {
            kind: t.kind,
            description: t.description.clone(),
            amount: t.amount,
            category: t.category.clone(),
            date: duplicate_date(t.date, target),
        })
        .collect()
}

/// Session-local flag set while a duplication pass is outstanding.
///
/// Not persisted: a restart while a pass is in flight can lead to a second
/// pass for the same month.
#[derive(Debug, Clone, Default)]
pub struct DuplicationGuard {
    in_flight: Arc<AtomicBool>,
}

impl DuplicationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another pass holds the permit.
    pub fn try_acquire(&self) -> Option<DuplicationPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DuplicationPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Clears the guard when dropped, whatever the outcome of the pass.
#[derive(Debug)]
pub struct DuplicationPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for DuplicationPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationReport {
    pub target: Month,
    pub inserted: Vec<DocId>,
    pub failed: usize,
}

/// Inserts a copy of every `previous` transaction dated into `target`.
///
/// Best effort: a failed insert is logged and skipped, and copies already
/// inserted stay in place.
pub fn duplicate_month(
    store: &dyn DocumentStore,
    paths: &UserPaths,
    previous: &[Transaction],
    target: Month,
    _permit: DuplicationPermit,
) -> DuplicationReport {
    let collection = paths.transactions();
    let mut report = DuplicationReport {
        target,
        inserted: Vec::new(),
        failed: 0,
    };

    for copy in build_duplicates(previous, target) {
        let result = serde_json::to_value(&copy)
            .map_err(Into::into)
            .and_then(|body| store.insert(&collection, body));
        match result {
            Ok(id) => report.inserted.push(id),
            Err(e) => {
                tracing::error!(
                    month = %target,
                    description = %copy.description,
                    "could not duplicate transaction: {e}"
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        month = %target,
        inserted = report.inserted.len(),
        failed = report.failed,
        "duplicated previous month's transactions"
    );
    report
}
