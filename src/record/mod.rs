//! Product transaction records and the stores that supply them.
//!
//! This module contains:
//! - The `TransactionRecord` model and its JSON representation
//! - The `RecordStore` collaborator that fetches records from the remote feed,
//!   an in-memory snapshot or a SQLite database
//! - Database functions for seeding and querying the SQLite record table

mod db;
mod store;

pub use db::{create_record_table, replace_all_records};
pub use store::{DEFAULT_DATA_URL, RecordStore, RemoteFeed, load_records_from_file};

use serde::{Deserialize, Deserializer, Serialize};
use time::{Month, OffsetDateTime};

/// Alias for the integer type used for record IDs.
pub type RecordId = i64;

/// The customer rating of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rating {
    /// The average rating.
    pub rate: f64,
    /// How many ratings the average is taken over.
    pub count: i64,
}

/// One product sale candidate from the transaction feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// The ID of the record, unique within a store.
    pub id: RecordId,
    /// The product title.
    pub title: String,
    /// The product description.
    #[serde(default)]
    pub description: String,
    /// The price of the product, never negative.
    #[serde(deserialize_with = "non_negative_price")]
    pub price: f64,
    /// The product category.
    pub category: String,
    /// A URL for the product image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Whether the sale went through.
    ///
    /// Some feeds do not carry this flag, see [crate::SoldPolicy].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
    /// When the product was sold.
    #[serde(with = "sale_date")]
    pub date_of_sale: OffsetDateTime,
    /// The product rating, zeroed when the feed omits it.
    #[serde(default, deserialize_with = "rating_or_default")]
    pub rating: Rating,
}

impl TransactionRecord {
    /// The calendar month of the sale in the record's own UTC offset.
    pub fn sale_month(&self) -> Month {
        self.date_of_sale.month()
    }

    /// The price formatted the way it is matched by free-text search.
    pub(crate) fn price_text(&self) -> String {
        self.price.to_string()
    }
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = f64::deserialize(deserializer)?;

    if price >= 0.0 {
        Ok(price)
    } else {
        Err(serde::de::Error::custom(format!(
            "price must not be negative, got {price}"
        )))
    }
}

fn rating_or_default<'de, D>(deserializer: D) -> Result<Rating, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct PartialRating {
        rate: Option<f64>,
        count: Option<i64>,
    }

    let rating = Option::<PartialRating>::deserialize(deserializer)?
        .map(|partial| Rating {
            rate: partial.rate.unwrap_or_default(),
            count: partial.count.unwrap_or_default(),
        })
        .unwrap_or_default();

    Ok(rating)
}

/// (De)serialization for `dateOfSale`.
///
/// Accepts RFC 3339 date-times and bare `YYYY-MM-DD` dates, the latter taken
/// as midnight UTC. Always writes RFC 3339.
pub(crate) mod sale_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::{
        Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
    };

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time::serde::rfc3339::serialize(value, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(D::Error::custom)
    }

    pub fn parse(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
        let text = text.trim();

        OffsetDateTime::parse(text, &Rfc3339).or_else(|_| {
            Date::parse(text, format_description!("[year]-[month]-[day]"))
                .map(|date| date.midnight().assume_utc())
        })
    }
}
