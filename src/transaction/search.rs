//! Free-text search over transaction records.

use crate::{month::MonthSelector, record::TransactionRecord};

/// The criteria a transaction must meet to appear in the listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    month: Option<MonthSelector>,
    needle: String,
    price: Option<f64>,
}

impl TransactionFilter {
    /// Match records sold in `month`, if given, whose title, description or
    /// price contains `search`, ignoring case.
    ///
    /// When `search` is a number, records with exactly that price also match,
    /// so "100.00" finds a record priced 100.
    ///
    /// An empty `search` matches every record.
    pub fn new(month: Option<MonthSelector>, search: &str) -> Self {
        let price = search
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite());

        Self {
            month,
            needle: search.to_lowercase(),
            price,
        }
    }

    /// The month the records must be sold in, if any.
    pub fn month(&self) -> Option<MonthSelector> {
        self.month
    }

    /// The lowercased search text.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// The search text read as a price, if it is a number.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    /// Whether `record` meets both the month and the search criteria.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.month.is_none_or(|month| month.contains(record)) && self.matches_search(record)
    }

    /// Whether `record` meets the search criteria, ignoring the month.
    pub fn matches_search(&self, record: &TransactionRecord) -> bool {
        self.needle.is_empty()
            || record.title.to_lowercase().contains(&self.needle)
            || record.description.to_lowercase().contains(&self.needle)
            || record.price_text().contains(&self.needle)
            || self.price.is_some_and(|price| record.price == price)
    }
}

/// Keep the records matching the search text of `filter`.
///
/// The month of `filter` is not applied here, run [crate::filter_by_month]
/// first. The relative order of the records is preserved.
pub fn search_records(
    records: Vec<TransactionRecord>,
    filter: &TransactionFilter,
) -> Vec<TransactionRecord> {
    records
        .into_iter()
        .filter(|record| filter.matches_search(record))
        .collect()
}
