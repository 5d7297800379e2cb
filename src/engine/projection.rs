// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only forward projection of loan progress for future month tabs.

use chrono::NaiveDate;

use crate::models::Loan;
use crate::month::Month;

/// The loan as it would look `month_offset` months after today's month.
///
/// Walks forward from the real current month, never from the
/// last-processed marker, and only clamps to the total at the end. This
/// differs from [`process_due`](super::amortization::process_due), which
/// stops accumulating as soon as the total is reached.
pub fn project(loan: &Loan, month_offset: i32, today: NaiveDate) -> Loan {
    if month_offset <= 0 {
        return loan.clone();
    }

    let current = Month::of(today);
    let target = current.plus(month_offset);
    if target > Month::of(loan.end_date) {
        return Loan {
            paid_amount: loan.total_amount,
            ..loan.clone()
        };
    }

    let mut projected = loan.paid_amount;
    for i in 1..=month_offset {
        let payment_day = current.plus(i).first_day();
        if payment_day >= loan.start_date && payment_day <= loan.end_date {
            projected += loan.monthly_payment;
        }
    }

    Loan {
        paid_amount: projected.min(loan.total_amount),
        ..loan.clone()
    }
}

pub fn project_all(loans: &[Loan], month_offset: i32, today: NaiveDate) -> Vec<Loan> {
    loans
        .iter()
        .map(|loan| project(loan, month_offset, today))
        .collect()
}

