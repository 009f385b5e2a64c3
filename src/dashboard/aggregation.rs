//! Aggregation of one month's transactions for the dashboard charts.
//!
//! Provides functions to summarize sales, bucket sold items by price and count
//! items per category. All of them expect records that have already been
//! filtered to a single month.

use std::collections::HashMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::record::TransactionRecord;

/// How to decide whether a record counts as sold.
///
/// Some feeds carry an explicit `sold` flag on every record, others have no
/// such flag and every record dated in the month is a completed sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SoldPolicy {
    /// Use the `sold` flag if any fetched record carries one, otherwise count
    /// every record as sold.
    #[default]
    Detect,
    /// Always use the `sold` flag, a record without one is unsold.
    Flag,
    /// Count every record as sold.
    AllSold,
}

impl SoldPolicy {
    /// Decide the sale mode for a snapshot of the record store.
    pub fn resolve(self, records: &[TransactionRecord]) -> SaleMode {
        match self {
            SoldPolicy::Flag => SaleMode::SoldFlag,
            SoldPolicy::AllSold => SaleMode::AllSold,
            SoldPolicy::Detect if records.iter().any(|record| record.sold.is_some()) => {
                SaleMode::SoldFlag
            }
            SoldPolicy::Detect => SaleMode::AllSold,
        }
    }
}

/// The rule used to split records into sold and unsold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleMode {
    /// A record is sold when its `sold` flag is set.
    SoldFlag,
    /// Every record is sold.
    AllSold,
}

impl SaleMode {
    /// Whether `record` counts as sold under this mode.
    pub fn is_sold(self, record: &TransactionRecord) -> bool {
        match self {
            SaleMode::SoldFlag => record.sold.unwrap_or(false),
            SaleMode::AllSold => true,
        }
    }
}

/// Sales totals for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    /// The sum of the prices of the sold items.
    pub total_sale_amount: f64,
    /// The number of sold items.
    pub total_sold_items: u64,
    /// The number of items that did not sell.
    pub total_unsold_items: u64,
}

/// Sums the sales of `records` and counts sold and unsold items.
pub fn summarize_sales(records: &[TransactionRecord], mode: SaleMode) -> StatisticsSummary {
    records
        .iter()
        .fold(StatisticsSummary::default(), |mut summary, record| {
            if mode.is_sold(record) {
                summary.total_sale_amount += record.price;
                summary.total_sold_items += 1;
            } else {
                summary.total_unsold_items += 1;
            }

            summary
        })
}

/// A price interval of the histogram.
///
/// Each band includes its upper bound and excludes the upper bound of the band
/// before it.
#[derive(Debug)]
struct PriceBand {
    upper_bound: f64,
    label: &'static str,
}

impl PriceBand {
    const fn new(upper_bound: f64, label: &'static str) -> Self {
        Self { upper_bound, label }
    }
}

const PRICE_BANDS: [PriceBand; 10] = [
    PriceBand::new(100.0, "0-100"),
    PriceBand::new(200.0, "101-200"),
    PriceBand::new(300.0, "201-300"),
    PriceBand::new(400.0, "301-400"),
    PriceBand::new(500.0, "401-500"),
    PriceBand::new(600.0, "501-600"),
    PriceBand::new(700.0, "601-700"),
    PriceBand::new(800.0, "701-800"),
    PriceBand::new(900.0, "801-900"),
    PriceBand::new(f64::INFINITY, "901-above"),
];

fn band_index(price: f64) -> usize {
    PRICE_BANDS
        .iter()
        .position(|band| price <= band.upper_bound)
        .unwrap_or(PRICE_BANDS.len() - 1)
}

/// The number of sold items in each price band.
///
/// Serializes as a JSON object with every band label in ascending price order,
/// including bands with no items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceHistogram {
    counts: [u64; PRICE_BANDS.len()],
}

impl PriceHistogram {
    /// Count the sold items of `records` per price band.
    pub fn from_records(records: &[TransactionRecord], mode: SaleMode) -> Self {
        let mut histogram = Self::default();

        for record in records.iter().filter(|record| mode.is_sold(record)) {
            histogram.counts[band_index(record.price)] += 1;
        }

        histogram
    }

    /// The count for the band called `label`, e.g. "101-200".
    pub fn count(&self, label: &str) -> Option<u64> {
        PRICE_BANDS
            .iter()
            .position(|band| band.label == label)
            .map(|index| self.counts[index])
    }

    /// The band labels and their counts in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        PRICE_BANDS
            .iter()
            .zip(self.counts.iter())
            .map(|(band, count)| (band.label, *count))
    }

    /// The number of items across all bands.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl Serialize for PriceHistogram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(PRICE_BANDS.len()))?;

        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }

        map.end()
    }
}

/// The number of items in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// The number of items in the category.
    pub count: u64,
}

/// Counts `records` per category.
///
/// Categories are listed in the order they first appear in `records`. Only
/// categories present in `records` are listed.
pub fn count_by_category(records: &[TransactionRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match positions.get(record.category.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(&record.category, counts.len());
                counts.push(CategoryCount {
                    category: record.category.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}
