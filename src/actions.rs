// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User-initiated changes to transactions, loans, goals and savings accounts.
//!
//! Input is validated here; nothing invalid reaches the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::models::{
    Loan, NewLoan, NewSavingGoal, NewSavingsAccount, NewTransaction, SavingGoal, SavingsAccount,
    Transaction, TransactionType,
};
use crate::session::Session;
use crate::store::DocId;

fn require_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok(name.to_string())
}

fn require_positive(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount(amount));
    }
    Ok(amount)
}

fn require_category(kind: TransactionType, category: &str) -> Result<String> {
    if !kind.allows(category) {
        return Err(Error::CategoryMismatch {
            category: category.to_string(),
            kind,
        });
    }
    Ok(category.to_string())
}

fn require_window(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::StartAfterEnd { start, end });
    }
    Ok(())
}

fn to_body<T: Serialize>(record: &T) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn amount(value: Decimal) -> Value {
    Value::String(value.to_string())
}

// Transactions

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub kind: TransactionType,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

pub fn add_transaction(session: &Session, input: TransactionInput) -> Result<DocId> {
    let record = NewTransaction {
        kind: input.kind,
        description: require_name(&input.description)?,
        amount: require_positive(input.amount)?,
        category: require_category(input.kind, &input.category)?,
        date: input.date.unwrap_or_else(|| session.today()),
    };
    let id = session
        .store
        .insert(&session.paths.transactions(), to_body(&record)?)?;
    tracing::debug!(%id, kind = %record.kind, "added transaction");
    Ok(id)
}

/// Fields left as `None` are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionEdit {
    pub kind: Option<TransactionType>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
}

/// Date and `createdAt` never change on edit.
pub fn edit_transaction(
    session: &Session,
    current: &Transaction,
    edit: TransactionEdit,
) -> Result<()> {
    let kind = edit.kind.unwrap_or(current.kind);
    let category = edit.category.as_deref().unwrap_or(&current.category);
    let description = edit.description.as_deref().unwrap_or(&current.description);
    let amount = edit.amount.unwrap_or(current.amount);

    let patch = fields([
        ("type", Value::String(kind.as_str().to_string())),
        ("description", Value::String(require_name(description)?)),
        ("amount", self::amount(require_positive(amount)?)),
        ("category", Value::String(require_category(kind, category)?)),
    ]);
    session
        .store
        .patch(&session.paths.transaction(&current.id), patch)
}

pub fn delete_transaction(session: &Session, id: &str) -> Result<()> {
    session.store.delete(&session.paths.transaction(id))
}

pub fn find_transaction(session: &Session, id: &str) -> Result<Transaction> {
    session
        .fetch_transactions()?
        .decode::<Transaction>()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(session.paths.transaction(id)))
}

// Loans

pub fn add_loan(session: &Session, loan: NewLoan) -> Result<DocId> {
    let record = NewLoan {
        name: require_name(&loan.name)?,
        total_amount: require_positive(loan.total_amount)?,
        monthly_payment: require_positive(loan.monthly_payment)?,
        ..loan
    };
    require_window(record.start_date, record.end_date)?;

    let mut body = to_body(&record)?;
    if let Value::Object(map) = &mut body {
        map.insert("paidAmount".to_string(), amount(Decimal::ZERO));
    }
    let id = session.store.insert(&session.paths.loans(), body)?;
    tracing::debug!(%id, "added loan");
    Ok(id)
}

/// Adds a manual payment; the result is clamped to `[0, totalAmount]`.
pub fn register_loan_payment(session: &Session, loan: &Loan, payment: Decimal) -> Result<Decimal> {
    require_positive(payment)?;
    let paid = (loan.paid_amount + payment).clamp(Decimal::ZERO, loan.total_amount);
    session.store.patch(
        &session.paths.loan(&loan.id),
        fields([("paidAmount", amount(paid))]),
    )?;
    Ok(paid)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanEdit {
    pub name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub monthly_payment: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn edit_loan(session: &Session, current: &Loan, edit: LoanEdit) -> Result<()> {
    let name = require_name(edit.name.as_deref().unwrap_or(&current.name))?;
    let total = require_positive(edit.total_amount.unwrap_or(current.total_amount))?;
    let monthly = require_positive(edit.monthly_payment.unwrap_or(current.monthly_payment))?;
    let start = edit.start_date.unwrap_or(current.start_date);
    let end = edit.end_date.unwrap_or(current.end_date);
    require_window(start, end)?;

    let mut patch = fields([
        ("name", Value::String(name)),
        ("totalAmount", amount(total)),
        ("monthlyPayment", amount(monthly)),
        ("startDate", json!(start)),
        ("endDate", json!(end)),
    ]);
    // A lower total must not leave the loan over-paid.
    if current.paid_amount > total {
        patch.insert("paidAmount".to_string(), amount(total));
    }
    session.store.patch(&session.paths.loan(&current.id), patch)
}

pub fn delete_loan(session: &Session, id: &str) -> Result<()> {
    session.store.delete(&session.paths.loan(id))
}

pub fn find_loan(session: &Session, id: &str) -> Result<Loan> {
    session
        .fetch_loans()?
        .decode::<Loan>()
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| Error::NotFound(session.paths.loan(id)))
}

// Saving goals

pub fn add_saving_goal(session: &Session, goal: NewSavingGoal) -> Result<DocId> {
    let record = NewSavingGoal {
        name: require_name(&goal.name)?,
        target_amount: require_positive(goal.target_amount)?,
    };
    let mut body = to_body(&record)?;
    if let Value::Object(map) = &mut body {
        map.insert("savedAmount".to_string(), amount(Decimal::ZERO));
    }
    session.store.insert(&session.paths.saving_goals(), body)
}

/// Adds a contribution; the result is clamped to `[0, targetAmount]`.
pub fn contribute_to_goal(
    session: &Session,
    goal: &SavingGoal,
    contribution: Decimal,
) -> Result<Decimal> {
    require_positive(contribution)?;
    let saved = (goal.saved_amount + contribution).clamp(Decimal::ZERO, goal.target_amount);
    session.store.patch(
        &session.paths.saving_goal(&goal.id),
        fields([("savedAmount", amount(saved))]),
    )?;
    Ok(saved)
}

pub fn find_saving_goal(session: &Session, id: &str) -> Result<SavingGoal> {
    session
        .fetch_saving_goals()?
        .decode::<SavingGoal>()
        .into_iter()
        .find(|g| g.id == id)
        .ok_or_else(|| Error::NotFound(session.paths.saving_goal(id)))
}

// Savings accounts

pub fn add_savings_account(session: &Session, account: NewSavingsAccount) -> Result<DocId> {
    if account.amount < Decimal::ZERO {
        return Err(Error::NegativeAmount(account.amount));
    }
    let record = NewSavingsAccount {
        name: require_name(&account.name)?,
        amount: account.amount,
    };
    session
        .store
        .insert(&session.paths.savings_accounts(), to_body(&record)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Deposit,
    Withdraw,
}

/// Moves money in or out of an account. The balance is free-running: a
/// withdrawal larger than the balance leaves it negative.
pub fn adjust_savings_account(
    session: &Session,
    account: &SavingsAccount,
    adjustment: Adjustment,
    value: Decimal,
) -> Result<Decimal> {
    require_positive(value)?;
    let balance = match adjustment {
        Adjustment::Deposit => account.amount + value,
        Adjustment::Withdraw => account.amount - value,
    };
    if balance < Decimal::ZERO {
        tracing::warn!(account = %account.id, %balance, "savings account balance is negative");
    }
    session.store.patch(
        &session.paths.savings_account(&account.id),
        fields([("amount", amount(balance))]),
    )?;
    Ok(balance)
}

pub fn rename_savings_account(session: &Session, id: &str, name: &str) -> Result<()> {
    let name = require_name(name)?;
    session.store.patch(
        &session.paths.savings_account(id),
        fields([("name", Value::String(name))]),
    )
}

pub fn delete_savings_account(session: &Session, id: &str) -> Result<()> {
    session.store.delete(&session.paths.savings_account(id))
}

pub fn find_savings_account(session: &Session, id: &str) -> Result<SavingsAccount> {
    session
        .fetch_savings_accounts()?
        .decode::<SavingsAccount>()
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| Error::NotFound(session.paths.savings_account(id)))
}
