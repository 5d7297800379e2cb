// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;

use chrono::NaiveDate;
use cuentas::engine::amortization::process_due;
use cuentas::engine::projection::{project, project_all};
use cuentas::models::Loan;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Loan {
    Loan {
        id: "car".into(),
        name: "Car".into(),
        total_amount: dec("1200"),
        paid_amount: Decimal::ZERO,
        start_date: d(2024, 1, 1),
        end_date: d(2024, 12, 1),
        monthly_payment: dec("100"),
        last_payment_process_date: None,
    }
}

#[test]
fn three_months_ahead() {
    let projected = project(&setup(), 3, d(2024, 1, 15));
    assert_eq!(projected.paid_amount, dec("300"));
}

#[test]
fn non_positive_offset_returns_loan_unchanged() {
    let loan = setup();
    assert_eq!(project(&loan, 0, d(2024, 1, 15)), loan);
    assert_eq!(project(&loan, -4, d(2024, 1, 15)), loan);
}

#[test]
fn target_after_end_is_fully_repaid() {
    let loan = setup();
    let projected = project(&loan, 12, d(2024, 1, 15));
    assert_eq!(projected.paid_amount, loan.total_amount);
}

#[test]
fn clamps_exactly_to_total() {
    let loan = Loan {
        total_amount: dec("250"),
        paid_amount: dec("120"),
        ..setup()
    };
    let projected = project(&loan, 6, d(2024, 1, 15));
    assert_eq!(projected.paid_amount, dec("250"));
}

#[test]
fn months_before_start_add_nothing() {
    let loan = Loan {
        start_date: d(2024, 3, 1),
        ..setup()
    };
    // Feb is before the start; Mar and Apr count.
    let projected = project(&loan, 3, d(2024, 1, 15));
    assert_eq!(projected.paid_amount, dec("200"));
}

#[test]
fn ignores_and_keeps_marker() {
    let loan = Loan {
        paid_amount: dec("100"),
        last_payment_process_date: Some("2023-06".parse().unwrap()),
        ..setup()
    };
    let projected = project(&loan, 2, d(2024, 1, 15));
    assert_eq!(projected.paid_amount, dec("300"));
    assert_eq!(
        projected.last_payment_process_date,
        loan.last_payment_process_date
    );
}

#[test]
fn differs_from_amortization_near_total() {
    // Amortization stops once the total is covered; projection only clamps
    // at the end. Both land on the total here, from different paths.
    let loan = Loan {
        total_amount: dec("150"),
        ..setup()
    };
    let update = process_due(&loan, d(2024, 5, 1)).unwrap();
    assert_eq!(update.paid_amount, dec("150"));
    assert_eq!(project(&loan, 4, d(2024, 1, 15)).paid_amount, dec("150"));
}

#[test]
fn project_all_preserves_order() {
    let loans = vec![
        setup(),
        Loan {
            id: "bike".into(),
            monthly_payment: dec("50"),
            ..setup()
        },
    ];
    let projected = project_all(&loans, 2, d(2024, 1, 15));
    assert_eq!(projected[0].id, "car");
    assert_eq!(projected[0].paid_amount, dec("200"));
    assert_eq!(projected[1].paid_amount, dec("100"));
}
