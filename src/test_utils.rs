#![allow(missing_docs)]

use std::time::Duration;

use crate::record::{Rating, RecordStore, RemoteFeed, TransactionRecord, sale_date};

/// Create a record with an empty description, no image and a zero rating.
///
/// `date` may be a bare `YYYY-MM-DD` date or an RFC 3339 date-time.
pub(crate) fn record(
    id: i64,
    title: &str,
    price: f64,
    category: &str,
    sold: Option<bool>,
    date: &str,
) -> TransactionRecord {
    TransactionRecord {
        id,
        title: title.to_owned(),
        description: String::new(),
        price,
        category: category.to_owned(),
        image: None,
        sold,
        date_of_sale: sale_date::parse(date).expect("Could not parse test sale date"),
        rating: Rating::default(),
    }
}

/// A handful of records resembling the public feed, spread over a few months.
pub(crate) fn sample_records() -> Vec<TransactionRecord> {
    let mut backpack = record(
        1,
        "Fjallraven  Foldsack No 1 Backpack, Fits 15 Laptops",
        329.85,
        "men's clothing",
        Some(false),
        "2021-11-27T20:29:54+05:30",
    );
    backpack.description = "Your perfect pack for everyday use and walks in the forest.".to_owned();
    backpack.image = Some("https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg".to_owned());
    backpack.rating = Rating {
        rate: 3.9,
        count: 120,
    };

    let mut jacket = record(
        2,
        "Mens Cotton Jacket",
        615.89,
        "men's clothing",
        Some(true),
        "2021-10-27T20:29:54+05:30",
    );
    jacket.description = "Great outerwear jackets for Spring/Autumn/Winter.".to_owned();
    jacket.rating = Rating {
        rate: 4.7,
        count: 500,
    };

    vec![
        backpack,
        jacket,
        record(3, "Solid Gold Petite Micropave", 168.0, "jewelery", Some(true), "2022-03-05"),
        record(4, "WD 2TB Elements Portable", 64.0, "electronics", None, "2022-03-31T23:30:00Z"),
        record(5, "SanDisk SSD PLUS 1TB", 109.0, "electronics", Some(false), "2021-07-15"),
    ]
}

/// A store whose every fetch fails because nothing listens on the port.
pub(crate) fn unreachable_store() -> RecordStore {
    RecordStore::Remote(
        RemoteFeed::new("http://127.0.0.1:1/feed.json", Duration::from_millis(500))
            .expect("Could not build HTTP client"),
    )
}
