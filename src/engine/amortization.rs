// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Automatic monthly loan payments.
//!
//! A loan remembers the last month whose payment was applied
//! (`lastPaymentProcessDate`). Each run applies one `monthlyPayment` for
//! every month started since then that falls within the loan's
//! `[startDate, endDate]` window and is not after today, stopping once the
//! loan is covered. Running again in the same month applies nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::Result;
use crate::models::Loan;
use crate::month::Month;
use crate::session::{Session, UserPaths};
use crate::store::{Batch, DocId, FieldPath};

pub const PAID_AMOUNT: &str = "paidAmount";
pub const LAST_PROCESSED: &str = "lastPaymentProcessDate";

#[derive(Debug, Clone, PartialEq)]
pub struct LoanUpdate {
    pub loan_id: DocId,
    pub paid_amount: Decimal,
    pub marker: Month,
}

pub fn process_due(loan: &Loan, today: NaiveDate) -> Option<LoanUpdate> {
    if loan.monthly_payment <= Decimal::ZERO || loan.paid_amount >= loan.total_amount {
        return None;
    }

    let last_processed = loan
        .last_payment_process_date
        .unwrap_or_else(|| Month::of(loan.start_date));

    let mut cursor = last_processed.succ().first_day();
    let mut accumulated = Decimal::ZERO;
    while cursor <= today && cursor >= loan.start_date && cursor <= loan.end_date {
        if loan.paid_amount + accumulated >= loan.total_amount {
            break;
        }
        accumulated += loan.monthly_payment;
        cursor = Month::of(cursor).succ().first_day();
    }

    if accumulated <= Decimal::ZERO {
        return None;
    }

    let update = LoanUpdate {
        loan_id: loan.id.clone(),
        paid_amount: (loan.paid_amount + accumulated).min(loan.total_amount),
        marker: Month::of(today),
    };
    tracing::debug!(
        loan = %loan.id,
        from = %loan.paid_amount,
        to = %update.paid_amount,
        "automatic loan payment due"
    );
    Some(update)
}

pub fn pending_updates(loans: &[Loan], today: NaiveDate) -> Vec<LoanUpdate> {
    loans
        .iter()
        .filter_map(|loan| process_due(loan, today))
        .collect()
}

/// One batch covering every pending loan, two fields per loan.
pub fn to_batch(paths: &UserPaths, updates: &[LoanUpdate]) -> Batch {
    let mut batch = Batch::new();
    for update in updates {
        let doc = paths.loan(&update.loan_id);
        batch.insert(
            FieldPath::new(doc.clone(), PAID_AMOUNT),
            Value::String(update.paid_amount.to_string()),
        );
        batch.insert(
            FieldPath::new(doc, LAST_PROCESSED),
            Value::String(update.marker.to_string()),
        );
    }
    batch
}

/// Writes every due payment in a single batch. Returns the number of loans
/// updated.
pub fn apply_due_payments(session: &Session, loans: &[Loan]) -> Result<usize> {
    let updates = pending_updates(loans, session.today());
    if updates.is_empty() {
        return Ok(0);
    }
    session
        .store
        .batch_write(&to_batch(&session.paths, &updates))?;
    tracing::info!("applied automatic payments to {} loan(s)", updates.len());
    Ok(updates.len())
}
