// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar month arithmetic and `YYYY-MM` month keys.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` when `month` is outside 1..=12 or the year is outside
    /// the range chrono can represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        // Validated in the constructors.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Day 0 of the following month.
    pub fn last_day(self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn succ(self) -> Self {
        self.plus(1)
    }

    pub fn pred(self) -> Self {
        self.plus(-1)
    }

    /// Moves `n` months forward (or backward when negative).
    pub fn plus(self, n: i32) -> Self {
        let index = self.index() + i64::from(n);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        let year = year.clamp(i64::from(NaiveDate::MIN.year()), i64::from(NaiveDate::MAX.year()));
        Self {
            year: year as i32,
            month,
        }
    }

    /// Whole months from `other` to `self`; positive when `self` is later.
    pub fn offset_from(self, other: Month) -> i32 {
        (self.index() - other.index()) as i32
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Month::of(date) == self
    }

    /// The given day of this month, clamped to the last day when the month is
    /// shorter (e.g. day 31 in April becomes April 30).
    pub fn day(self, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.last_day())
    }

    /// Inclusive range of months; empty when `from` is after `to`.
    pub fn range(from: Month, to: Month) -> Vec<Month> {
        let len = to.offset_from(from);
        if len < 0 {
            return Vec::new();
        }
        (0..=len).map(|i| from.plus(i)).collect()
    }

    /// The month tab strip: `before` months preceding `current`, `current`
    /// itself, then `after` months following it.
    pub fn tabs(current: Month, before: u32, after: u32) -> Vec<Month> {
        Month::range(current.plus(-(before as i32)), current.plus(after as i32))
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(s.to_string());
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if y.len() != 4 || m.len() != 2 || !digits(y) || !digits(m) {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
