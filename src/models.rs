// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::Month;
use crate::store::DocId;

pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investments", "Gifts", "Other"];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Housing",
    "Food",
    "Transport",
    "Utilities",
    "Health",
    "Leisure",
    "Shopping",
    "Education",
    "Debt",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn categories(self) -> &'static [&'static str] {
        match self {
            Self::Income => INCOME_CATEGORIES,
            Self::Expense => EXPENSE_CATEGORIES,
        }
    }

    pub fn allows(self, category: &str) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// Store-assigned insertion order. Only meaningful for sorting.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderKey(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: DocId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: OrderKey,
}

/// Body written when a transaction is created; the store adds the id and `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(default)]
    pub id: DocId,
    pub name: String,
    pub total_amount: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: Decimal,
    /// Last month for which the automatic payment was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_process_date: Option<Month>,
}

impl Loan {
    pub fn outstanding(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn is_repaid(&self) -> bool {
        self.paid_amount >= self.total_amount
    }

    pub fn progress_percent(&self) -> Decimal {
        percent(self.paid_amount, self.total_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub name: String,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoal {
    #[serde(default)]
    pub id: DocId,
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub saved_amount: Decimal,
}

impl SavingGoal {
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.saved_amount).max(Decimal::ZERO)
    }

    pub fn progress_percent(&self) -> Decimal {
        percent(self.saved_amount, self.target_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingGoal {
    pub name: String,
    pub target_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsAccount {
    #[serde(default)]
    pub id: DocId,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSavingsAccount {
    pub name: String,
    pub amount: Decimal,
}

fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}
