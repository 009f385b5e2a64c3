//! The record store collaborator that supplies transaction records.

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;

use crate::{
    Error,
    month::filter_by_month,
    pagination::{PageRequest, PageResult, Pagination, paginate},
    transaction::{TransactionFilter, search_records},
};

use super::{
    TransactionRecord,
    db::{get_all_records, query_records},
};

/// The public feed of product transactions.
pub const DEFAULT_DATA_URL: &str =
    "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// A client for the remote JSON feed of transaction records.
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    url: String,
    client: reqwest::Client,
}

impl RemoteFeed {
    /// Create a client for the feed at `url`.
    ///
    /// Requests that take longer than `timeout` fail with [Error::SourceUnavailable].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.to_owned(),
            client,
        })
    }

    /// Download every record in the feed.
    ///
    /// # Errors
    /// Returns [Error::SourceUnavailable] on network errors, non-success
    /// status codes and malformed JSON.
    pub async fn fetch(&self) -> Result<Vec<TransactionRecord>, Error> {
        let records = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<TransactionRecord>>()
            .await?;

        tracing::debug!("Fetched {} records from {}", records.len(), self.url);

        Ok(records)
    }
}

/// Read a JSON array of transaction records from the file at `path`.
///
/// # Errors
/// Returns [Error::SourceUnavailable] if the file cannot be read or parsed.
pub fn load_records_from_file(path: &Path) -> Result<Vec<TransactionRecord>, Error> {
    let text = fs::read_to_string(path).map_err(|error| {
        tracing::error!("could not read records from {}: {error}", path.display());
        Error::SourceUnavailable(error.to_string())
    })?;

    serde_json::from_str(&text).map_err(|error| {
        tracing::error!("could not parse records in {}: {error}", path.display());
        Error::SourceUnavailable(error.to_string())
    })
}

/// Where the transaction records for a request come from.
///
/// Every request fetches a fresh snapshot. The snapshot is never modified
/// while a request is being served.
#[derive(Debug, Clone)]
pub enum RecordStore {
    /// Download the full feed on every request.
    Remote(RemoteFeed),
    /// A fixed snapshot held in memory.
    InMemory(Arc<[TransactionRecord]>),
    /// A SQLite database seeded from the feed.
    Database(Arc<Mutex<Connection>>),
}

impl RecordStore {
    /// Create a store that serves a fixed set of records.
    pub fn in_memory(records: Vec<TransactionRecord>) -> Self {
        Self::InMemory(records.into())
    }

    /// Fetch every record in the store in the store's natural order.
    ///
    /// # Errors
    /// Returns [Error::SourceUnavailable] if the records could not be fetched
    /// or [Error::DatabaseLockError] if the database lock is poisoned.
    pub async fn fetch_all(&self) -> Result<Vec<TransactionRecord>, Error> {
        match self {
            Self::Remote(feed) => feed.fetch().await,
            Self::InMemory(records) => Ok(records.to_vec()),
            Self::Database(connection) => get_all_records(connection),
        }
    }

    /// Get one page of the records matching `filter`.
    ///
    /// The database store runs the filter and pagination in SQL, the other
    /// stores fetch everything and filter in memory.
    ///
    /// # Errors
    /// Returns the same errors as [RecordStore::fetch_all].
    pub async fn query(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResult<TransactionRecord>, Error> {
        if let Self::Database(connection) = self {
            let (items, total_documents) =
                query_records(filter, page.skip(), page.per_page(), connection)?;

            return Ok(PageResult {
                items,
                pagination: Pagination::new(total_documents, page),
            });
        }

        let records = self.fetch_all().await?;
        let records = match filter.month() {
            Some(month) => filter_by_month(records, month),
            None => records,
        };

        Ok(paginate(search_records(records, filter), page))
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use axum::{Json, Router, http::StatusCode, routing::get};
    use tokio::net::TcpListener;

    use crate::{
        Error, MonthSelector, PageRequest, TransactionFilter,
        test_utils::{record, sample_records},
    };

    use super::{RecordStore, RemoteFeed, TransactionRecord, load_records_from_file};

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind test listener");
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{address}/feed.json")
    }

    #[tokio::test]
    async fn remote_feed_downloads_records() {
        let records = sample_records();
        let body = records.clone();
        let url = serve(Router::new().route(
            "/feed.json",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        ))
        .await;

        let feed = RemoteFeed::new(&url, Duration::from_secs(5)).unwrap();
        let got = feed.fetch().await.unwrap();

        assert_eq!(got, records);
    }

    #[tokio::test]
    async fn remote_feed_fails_on_error_status() {
        let url = serve(Router::new().route(
            "/feed.json",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;

        let store = RecordStore::Remote(RemoteFeed::new(&url, Duration::from_secs(5)).unwrap());
        let result = store.fetch_all().await;

        assert!(
            matches!(result, Err(Error::SourceUnavailable(_))),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn remote_feed_fails_on_malformed_json() {
        let url = serve(Router::new().route("/feed.json", get(|| async { "[{\"id\": 1}]" })))
            .await;

        let feed = RemoteFeed::new(&url, Duration::from_secs(5)).unwrap();
        let result = feed.fetch().await;

        assert!(
            matches!(result, Err(Error::SourceUnavailable(_))),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn remote_feed_rejects_negative_prices() {
        let url = serve(Router::new().route(
            "/feed.json",
            get(|| async {
                "[{\"id\": 1, \"title\": \"Refund\", \"price\": -5.0, \
                \"category\": \"misc\", \"dateOfSale\": \"2021-03-05\"}]"
            }),
        ))
        .await;

        let feed = RemoteFeed::new(&url, Duration::from_secs(5)).unwrap();
        let result = feed.fetch().await;

        assert!(
            matches!(result, Err(Error::SourceUnavailable(_))),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn in_memory_store_returns_records_in_order() {
        let records = sample_records();
        let store = RecordStore::in_memory(records.clone());

        let got = store.fetch_all().await.unwrap();

        assert_eq!(got, records);
    }

    #[tokio::test]
    async fn in_memory_query_filters_by_month_then_search() {
        let store = RecordStore::in_memory(vec![
            record(1, "Blue shirt", 20.0, "clothing", Some(true), "2021-03-05"),
            record(2, "Blue mug", 8.0, "kitchen", Some(true), "2021-04-05"),
            record(3, "Red shirt", 25.0, "clothing", Some(false), "2022-03-15"),
        ]);
        let filter = TransactionFilter::new(Some(MonthSelector::parse("March").unwrap()), "blue");

        let got = store
            .query(&filter, PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();

        let ids: Vec<_> = got.items.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(got.pagination.total_documents, 1);
    }

    #[test]
    fn loads_records_from_file() {
        let records = sample_records();
        let path = std::env::temp_dir().join(format!(
            "sales_dashboard_records_{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let got: Vec<TransactionRecord> = load_records_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(got, records);
    }

    #[test]
    fn file_with_negative_price_is_source_unavailable() {
        let path = std::env::temp_dir().join(format!(
            "sales_dashboard_negative_{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"[{"id": 1, "title": "Refund", "price": -1, "category": "misc", "dateOfSale": "2021-03-05"}]"#,
        )
        .unwrap();

        let result = load_records_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let result = load_records_from_file(std::path::Path::new("/does/not/exist.json"));

        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }
}
