//! SQLite storage for transaction records.
//!
//! Records are written once by the seed tool and only read while serving
//! requests. Besides the record fields, each row stores the sale month and
//! lowercased copies of the searchable text so that month filtering and
//! free-text search can run in SQL with the same results as the in-memory
//! filters.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Row};

use crate::{Error, transaction::TransactionFilter};

use super::{Rating, TransactionRecord};

const RECORD_COLUMNS: &str = "id, title, description, category, price, image, sold, \
    date_of_sale, rating_rate, rating_count";

const FILTER_CLAUSE: &str = "WHERE (?1 IS NULL OR sale_month = ?1) \
    AND (?2 = '' \
        OR instr(search_title, ?2) > 0 \
        OR instr(search_description, ?2) > 0 \
        OR instr(price_text, ?2) > 0 \
        OR price = ?3)";

/// Create the table for transaction records if it does not already exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS product_transaction (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            price REAL NOT NULL CHECK (price >= 0),
            image TEXT,
            sold INTEGER,
            date_of_sale TEXT NOT NULL,
            rating_rate REAL NOT NULL DEFAULT 0,
            rating_count INTEGER NOT NULL DEFAULT 0,
            sale_month INTEGER NOT NULL,
            search_title TEXT NOT NULL,
            search_description TEXT NOT NULL,
            price_text TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Replace every record in the database with `records`.
///
/// The old records are deleted and the new ones inserted in a single SQL
/// transaction, so readers never see a partial update.
///
/// # Errors
/// Returns an error if any record cannot be inserted, e.g. a duplicate ID or
/// a negative price. The database is left unchanged in that case.
pub fn replace_all_records(
    records: &[TransactionRecord],
    connection: &mut Connection,
) -> Result<usize, rusqlite::Error> {
    let transaction = connection.transaction()?;
    transaction.execute("DELETE FROM product_transaction", ())?;

    {
        let mut statement = transaction.prepare(
            "INSERT INTO product_transaction (
                id, title, description, category, price, image, sold, date_of_sale,
                rating_rate, rating_count, sale_month, search_title, search_description,
                price_text
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;

        for record in records {
            statement.execute(rusqlite::params![
                record.id,
                record.title,
                record.description,
                record.category,
                record.price,
                record.image,
                record.sold,
                record.date_of_sale,
                record.rating.rate,
                record.rating.count,
                u8::from(record.sale_month()),
                record.title.to_lowercase(),
                record.description.to_lowercase(),
                record.price_text(),
            ])?;
        }
    }

    transaction.commit()?;

    Ok(records.len())
}

fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

/// Get every record in insertion order.
pub(super) fn get_all_records(
    connection: &Mutex<Connection>,
) -> Result<Vec<TransactionRecord>, Error> {
    let connection = lock_connection(connection)?;

    connection
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM product_transaction ORDER BY rowid ASC"
        ))?
        .query_map((), map_record_row)?
        .map(|record_result| record_result.map_err(Error::from))
        .collect()
}

/// Get at most `limit` records matching `filter`, skipping the first `skip`
/// matches, along with the total number of matches.
pub(super) fn query_records(
    filter: &TransactionFilter,
    skip: u64,
    limit: u64,
    connection: &Mutex<Connection>,
) -> Result<(Vec<TransactionRecord>, u64), Error> {
    let connection = lock_connection(connection)?;

    let month = filter.month().map(|month| u8::from(month.month()));
    let needle = filter.needle();
    let price = filter.price();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let skip = i64::try_from(skip).unwrap_or(i64::MAX);

    let total_documents: i64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM product_transaction {FILTER_CLAUSE}"),
        (month, needle, price),
        |row| row.get(0),
    )?;

    let items = connection
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM product_transaction {FILTER_CLAUSE} \
            ORDER BY rowid ASC LIMIT ?4 OFFSET ?5"
        ))?
        .query_map((month, needle, price, limit, skip), map_record_row)?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    Ok((items, total_documents.max(0) as u64))
}

fn map_record_row(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        price: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale: row.get(7)?,
        rating: Rating {
            rate: row.get(8)?,
            count: row.get(9)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rusqlite::Connection;

    use crate::{
        MonthSelector, TransactionFilter,
        test_utils::{record, sample_records},
    };

    use super::{create_record_table, get_all_records, query_records, replace_all_records};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_record_table(&conn).unwrap();
        conn
    }

    #[test]
    fn stores_and_reads_back_records() {
        let mut conn = get_test_connection();
        let records = sample_records();

        let inserted = replace_all_records(&records, &mut conn).unwrap();
        let got = get_all_records(&Mutex::new(conn)).unwrap();

        assert_eq!(inserted, records.len());
        assert_eq!(got, records);
    }

    #[test]
    fn replacing_records_discards_old_ones() {
        let mut conn = get_test_connection();
        replace_all_records(&sample_records(), &mut conn).unwrap();
        let replacement = vec![record(99, "Only one", 1.0, "misc", None, "2021-01-01")];

        replace_all_records(&replacement, &mut conn).unwrap();
        let got = get_all_records(&Mutex::new(conn)).unwrap();

        assert_eq!(got, replacement);
    }

    #[test]
    fn failed_replacement_keeps_existing_records() {
        let mut conn = get_test_connection();
        let records = sample_records();
        replace_all_records(&records, &mut conn).unwrap();
        let duplicate_ids = vec![
            record(7, "First", 1.0, "misc", None, "2021-01-01"),
            record(7, "Second", 2.0, "misc", None, "2021-01-02"),
        ];

        let result = replace_all_records(&duplicate_ids, &mut conn);
        let got = get_all_records(&Mutex::new(conn)).unwrap();

        assert!(result.is_err());
        assert_eq!(got, records);
    }

    #[test]
    fn query_matches_month_and_search_like_in_memory_filter() {
        let mut conn = get_test_connection();
        let records = vec![
            record(1, "Blue Shirt", 20.0, "clothing", Some(true), "2021-03-05"),
            record(2, "Blue mug", 8.0, "kitchen", Some(true), "2021-04-05"),
            record(3, "Red shirt", 25.0, "clothing", Some(false), "2022-03-15"),
            record(4, "Lamp", 120.5, "home", Some(true), "2021-03-20"),
        ];
        replace_all_records(&records, &mut conn).unwrap();
        let conn = Mutex::new(conn);
        let march = Some(MonthSelector::parse("march").unwrap());

        for (month, search) in [
            (march, "SHIRT"),
            (march, "120.5"),
            (march, "120.50"),
            (march, ""),
            (None, "20.00"),
            (None, " 8.0 "),
            (None, "blue"),
            (None, "nothing matches this"),
        ] {
            let filter = TransactionFilter::new(month, search);
            let want: Vec<_> = records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect();

            let (got, total) = query_records(&filter, 0, 10, &conn).unwrap();

            assert_eq!(got, want, "month {month:?}, search {search:?}");
            assert_eq!(total, want.len() as u64);
        }
    }

    #[test]
    fn query_matches_numerically_equal_price() {
        let mut conn = get_test_connection();
        let records = vec![
            record(1, "Desk", 100.0, "furniture", Some(true), "2021-03-01"),
            record(2, "Pen", 22.3, "office", Some(true), "2021-03-01"),
        ];
        replace_all_records(&records, &mut conn).unwrap();
        let conn = Mutex::new(conn);

        for (search, want) in [("100.00", vec![1]), ("22.30", vec![2]), ("100.5", vec![])] {
            let (got, total) =
                query_records(&TransactionFilter::new(None, search), 0, 10, &conn).unwrap();

            let ids: Vec<i64> = got.iter().map(|record| record.id).collect();
            assert_eq!(ids, want, "search {search:?}");
            assert_eq!(total, want.len() as u64);
        }
    }

    #[test]
    fn query_applies_skip_and_limit_after_counting() {
        let mut conn = get_test_connection();
        let records: Vec<_> = (1..=25)
            .map(|id| record(id, "Item", id as f64, "misc", Some(true), "2021-06-01"))
            .collect();
        replace_all_records(&records, &mut conn).unwrap();
        let conn = Mutex::new(conn);
        let filter = TransactionFilter::new(None, "");

        let (page, total) = query_records(&filter, 20, 10, &conn).unwrap();

        assert_eq!(total, 25);
        let ids: Vec<_> = page.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25]);
    }
}
