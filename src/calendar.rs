use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ApplicationError, Result};

/// calendar month identified by year and month, compared by equality
///
/// wire format is "YYYY-MM", matching the catalog value field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// create a month key, rejecting out-of-range months
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ApplicationError::InvalidMonthKey {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// first calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month key holds a valid calendar month")
    }

    /// last calendar day of the month
    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, days_in_month(self.year, self.month))
            .expect("month key holds a valid calendar month")
    }

    /// display label, e.g. "Feb 2024"
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// step forward by whole months
    pub fn plus_months(&self, months: u32) -> MonthKey {
        let total = self.year * 12 + (self.month as i32 - 1) + months as i32;
        MonthKey {
            year: total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ApplicationError::InvalidMonthKey {
            value: s.to_string(),
        };
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// candidate repayment month offered by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthOption {
    pub value: MonthKey,
    pub label: String,
    pub last_day: NaiveDate,
}

impl MonthOption {
    pub fn from_key(key: MonthKey) -> Self {
        Self {
            value: key,
            label: key.label(),
            last_day: key.last_day(),
        }
    }
}

/// available months for repayment selection, starting at the posting month
///
/// pure function of its inputs; identical inputs yield identical output
pub fn available_months(posting_date: NaiveDate, months_ahead: u32) -> Vec<MonthOption> {
    let start = MonthKey::from_date(posting_date);
    (0..months_ahead)
        .map(|i| MonthOption::from_key(start.plus_months(i)))
        .collect()
}

/// external collaborator supplying the month catalog
pub trait CatalogProvider {
    fn available_months(&self, posting_date: NaiveDate, months_ahead: u32) -> Result<Vec<MonthOption>>;
}

/// in-process catalog backed by the pure month generator
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCatalog;

impl CatalogProvider for LocalCatalog {
    fn available_months(&self, posting_date: NaiveDate, months_ahead: u32) -> Result<Vec<MonthOption>> {
        Ok(available_months(posting_date, months_ahead))
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
