// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library error type shared by the store, engine and user actions.

use rust_decimal::Decimal;

use crate::models::TransactionType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A month key was not of the form `YYYY-MM`.
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("name cannot be empty")]
    EmptyName,

    /// Amounts entered by the user for income, expenses, loans, payments and
    /// contributions must be strictly positive.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount cannot be negative, got {0}")]
    NegativeAmount(Decimal),

    /// The category does not belong to the category set of the transaction type.
    #[error("category '{category}' is not a valid {kind} category")]
    CategoryMismatch {
        category: String,
        kind: TransactionType,
    },

    #[error("start date {start} is after end date {end}")]
    StartAfterEnd {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The document path did not refer to a stored document.
    #[error("no document at '{0}'")]
    NotFound(String),

    /// Documents must be JSON objects so that fields can be patched individually.
    #[error("document body at '{0}' is not a JSON object")]
    NotAnObject(String),

    #[error("invalid document path '{0}'")]
    InvalidPath(String),

    #[error("could not acquire the store lock")]
    DatabaseLock,

    #[error("an unexpected SQL error occurred: {0}")]
    Sql(String),

    #[error("could not (de)serialize document: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {value}");
        Error::Sql(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Serialization(value.to_string())
    }
}
