//! Month selection and filtering of records by calendar month.
//!
//! Records are matched on month-of-year only. A record sold in March 2021 and
//! one sold in March 2022 both belong to "March".

use std::{fmt, str::FromStr};

use time::Month;

use crate::{Error, record::TransactionRecord};

const MONTH_NAMES: [(&str, Month); 12] = [
    ("January", Month::January),
    ("February", Month::February),
    ("March", Month::March),
    ("April", Month::April),
    ("May", Month::May),
    ("June", Month::June),
    ("July", Month::July),
    ("August", Month::August),
    ("September", Month::September),
    ("October", Month::October),
    ("November", Month::November),
    ("December", Month::December),
];

/// A validated calendar month chosen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSelector(Month);

impl MonthSelector {
    /// Select `month`.
    pub fn new(month: Month) -> Self {
        Self(month)
    }

    /// Parse an English month name or a month number from 1 to 12.
    ///
    /// Names are trimmed and matched case-insensitively, so "march", " MARCH "
    /// and "March" all select March.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] for anything else.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let trimmed = value.trim();
        let invalid = || Error::InvalidMonth(value.to_owned());

        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            let number: u8 = trimmed.parse().map_err(|_| invalid())?;
            return Month::try_from(number).map(Self).map_err(|_| invalid());
        }

        let name = title_case(trimmed);

        MONTH_NAMES
            .iter()
            .find(|(month_name, _)| *month_name == name)
            .map(|(_, month)| Self(*month))
            .ok_or_else(invalid)
    }

    /// Parse an optional month request parameter.
    ///
    /// # Errors
    /// Returns [Error::MissingMonth] if `value` is absent or blank, otherwise
    /// the same errors as [MonthSelector::parse].
    pub fn from_param(value: Option<&str>) -> Result<Self, Error> {
        match value {
            Some(value) if !value.trim().is_empty() => Self::parse(value),
            _ => Err(Error::MissingMonth),
        }
    }

    /// The selected month.
    pub fn month(self) -> Month {
        self.0
    }

    /// Whether `record` was sold in the selected month of any year.
    pub fn contains(self, record: &TransactionRecord) -> bool {
        record.sale_month() == self.0
    }
}

impl FromStr for MonthSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MonthSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();

    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Keep the records sold in `month`, ignoring the year of the sale.
///
/// The relative order of the records is preserved.
pub fn filter_by_month(
    records: Vec<TransactionRecord>,
    month: MonthSelector,
) -> Vec<TransactionRecord> {
    records
        .into_iter()
        .filter(|record| month.contains(record))
        .collect()
}
