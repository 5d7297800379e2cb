// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use cuentas::Error;
use cuentas::actions::{self, Adjustment, LoanEdit, TransactionEdit, TransactionInput};
use cuentas::clock::FixedClock;
use cuentas::models::{
    Loan, NewLoan, NewSavingGoal, NewSavingsAccount, SavingGoal, Transaction, TransactionType,
};
use cuentas::session::Session;
use cuentas::store::MemoryStore;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn setup() -> Session {
    Session::new(
        Arc::new(MemoryStore::new()),
        "u1",
        Arc::new(FixedClock(d(2024, 4, 15))),
    )
}

fn rent() -> TransactionInput {
    TransactionInput {
        kind: TransactionType::Expense,
        description: "Rent".into(),
        amount: dec("900"),
        category: "Housing".into(),
        date: None,
    }
}

fn car() -> NewLoan {
    NewLoan {
        name: "Car".into(),
        total_amount: dec("1200"),
        start_date: d(2024, 1, 1),
        end_date: d(2024, 12, 1),
        monthly_payment: dec("100"),
    }
}

#[test]
fn transaction_date_defaults_to_today() {
    let session = setup();
    let id = actions::add_transaction(&session, rent()).unwrap();
    let tx = actions::find_transaction(&session, &id).unwrap();
    assert_eq!(tx.date, d(2024, 4, 15));
    assert_eq!(tx.category, "Housing");
}

#[test]
fn transaction_validation() {
    let session = setup();
    let wrong_category = TransactionInput {
        category: "Salary".into(),
        ..rent()
    };
    assert_eq!(
        actions::add_transaction(&session, wrong_category),
        Err(Error::CategoryMismatch {
            category: "Salary".into(),
            kind: TransactionType::Expense
        })
    );
    let zero = TransactionInput {
        amount: Decimal::ZERO,
        ..rent()
    };
    assert_eq!(
        actions::add_transaction(&session, zero),
        Err(Error::NonPositiveAmount(Decimal::ZERO))
    );
    let blank = TransactionInput {
        description: "   ".into(),
        ..rent()
    };
    assert_eq!(actions::add_transaction(&session, blank), Err(Error::EmptyName));

    let stored: Vec<Transaction> = session.fetch_transactions().unwrap().decode();
    assert!(stored.is_empty());
}

#[test]
fn edit_keeps_date_and_order() {
    let session = setup();
    let id = actions::add_transaction(
        &session,
        TransactionInput {
            date: Some(d(2024, 3, 2)),
            ..rent()
        },
    )
    .unwrap();
    let before = actions::find_transaction(&session, &id).unwrap();

    actions::edit_transaction(
        &session,
        &before,
        TransactionEdit {
            kind: Some(TransactionType::Income),
            category: Some("Gifts".into()),
            amount: Some(dec("50")),
            ..Default::default()
        },
    )
    .unwrap();

    let after = actions::find_transaction(&session, &id).unwrap();
    assert_eq!(after.kind, TransactionType::Income);
    assert_eq!(after.category, "Gifts");
    assert_eq!(after.amount, dec("50"));
    assert_eq!(after.description, "Rent");
    assert_eq!(after.date, before.date);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn edit_rejects_type_change_with_stale_category() {
    let session = setup();
    let id = actions::add_transaction(&session, rent()).unwrap();
    let current = actions::find_transaction(&session, &id).unwrap();
    let err = actions::edit_transaction(
        &session,
        &current,
        TransactionEdit {
            kind: Some(TransactionType::Income),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::CategoryMismatch { .. }));
}

#[test]
fn delete_transaction_then_lookup_fails() {
    let session = setup();
    let id = actions::add_transaction(&session, rent()).unwrap();
    actions::delete_transaction(&session, &id).unwrap();
    assert!(matches!(
        actions::find_transaction(&session, &id),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn new_loan_starts_unpaid_and_unprocessed() {
    let session = setup();
    let id = actions::add_loan(&session, car()).unwrap();
    let loan = actions::find_loan(&session, &id).unwrap();
    assert_eq!(loan.paid_amount, Decimal::ZERO);
    assert_eq!(loan.last_payment_process_date, None);
}

#[test]
fn loan_validation() {
    let session = setup();
    let reversed = NewLoan {
        start_date: d(2025, 1, 1),
        ..car()
    };
    assert_eq!(
        actions::add_loan(&session, reversed),
        Err(Error::StartAfterEnd {
            start: d(2025, 1, 1),
            end: d(2024, 12, 1)
        })
    );
    let free = NewLoan {
        monthly_payment: dec("-5"),
        ..car()
    };
    assert_eq!(
        actions::add_loan(&session, free),
        Err(Error::NonPositiveAmount(dec("-5")))
    );
}

#[test]
fn manual_payment_clamps_to_total() {
    let session = setup();
    let id = actions::add_loan(&session, car()).unwrap();
    let loan = actions::find_loan(&session, &id).unwrap();
    assert_eq!(
        actions::register_loan_payment(&session, &loan, dec("250")).unwrap(),
        dec("250")
    );

    let loan = actions::find_loan(&session, &id).unwrap();
    assert_eq!(
        actions::register_loan_payment(&session, &loan, dec("5000")).unwrap(),
        dec("1200")
    );
    assert!(actions::find_loan(&session, &id).unwrap().is_repaid());
    assert!(actions::register_loan_payment(&session, &loan, Decimal::ZERO).is_err());
}

#[test]
fn lowering_total_below_paid_clamps_paid() {
    let session = setup();
    let id = actions::add_loan(&session, car()).unwrap();
    let loan = actions::find_loan(&session, &id).unwrap();
    actions::register_loan_payment(&session, &loan, dec("800")).unwrap();

    let loan: Loan = actions::find_loan(&session, &id).unwrap();
    actions::edit_loan(
        &session,
        &loan,
        LoanEdit {
            total_amount: Some(dec("600")),
            name: Some("Car (refinanced)".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let loan = actions::find_loan(&session, &id).unwrap();
    assert_eq!(loan.total_amount, dec("600"));
    assert_eq!(loan.paid_amount, dec("600"));
    assert_eq!(loan.name, "Car (refinanced)");
    assert_eq!(loan.start_date, d(2024, 1, 1));
}

#[test]
fn goal_contributions_clamp_to_target() {
    let session = setup();
    let id = actions::add_saving_goal(
        &session,
        NewSavingGoal {
            name: "Trip".into(),
            target_amount: dec("500"),
        },
    )
    .unwrap();
    let goal: SavingGoal = actions::find_saving_goal(&session, &id).unwrap();
    assert_eq!(goal.saved_amount, Decimal::ZERO);

    assert_eq!(
        actions::contribute_to_goal(&session, &goal, dec("700")).unwrap(),
        dec("500")
    );
    let goal = actions::find_saving_goal(&session, &id).unwrap();
    assert_eq!(goal.remaining(), Decimal::ZERO);
    assert_eq!(goal.progress_percent(), dec("100"));
}

#[test]
fn savings_account_balance_is_free_running() {
    let session = setup();
    let id = actions::add_savings_account(
        &session,
        NewSavingsAccount {
            name: "Emergency".into(),
            amount: dec("100"),
        },
    )
    .unwrap();

    let account = actions::find_savings_account(&session, &id).unwrap();
    let balance =
        actions::adjust_savings_account(&session, &account, Adjustment::Deposit, dec("50"))
            .unwrap();
    assert_eq!(balance, dec("150"));

    let account = actions::find_savings_account(&session, &id).unwrap();
    let balance =
        actions::adjust_savings_account(&session, &account, Adjustment::Withdraw, dec("200"))
            .unwrap();
    assert_eq!(balance, dec("-50"));
    assert_eq!(
        actions::find_savings_account(&session, &id).unwrap().amount,
        dec("-50")
    );
}

#[test]
fn savings_account_rename_and_delete() {
    let session = setup();
    assert_eq!(
        actions::add_savings_account(
            &session,
            NewSavingsAccount {
                name: "Bad".into(),
                amount: dec("-1"),
            },
        ),
        Err(Error::NegativeAmount(dec("-1")))
    );

    let id = actions::add_savings_account(
        &session,
        NewSavingsAccount {
            name: "Old".into(),
            amount: Decimal::ZERO,
        },
    )
    .unwrap();
    actions::rename_savings_account(&session, &id, "  New  ").unwrap();
    assert_eq!(
        actions::find_savings_account(&session, &id).unwrap().name,
        "New"
    );
    assert_eq!(
        actions::rename_savings_account(&session, &id, ""),
        Err(Error::EmptyName)
    );

    actions::delete_savings_account(&session, &id).unwrap();
    assert!(session.fetch_savings_accounts().unwrap().is_empty());
}
