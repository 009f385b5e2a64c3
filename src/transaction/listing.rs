//! Defines the route handler for the searchable, paginated transaction listing.

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    extract::MonthParam,
    month::MonthSelector,
    pagination::{PageRequest, PageResult, PaginationConfig},
    record::{RecordStore, TransactionRecord},
};

use super::search::TransactionFilter;

/// The state needed for the transaction listing.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// Where the transaction records come from.
    pub record_store: RecordStore,
    /// The page defaults for requests that leave them out.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            record_store: state.record_store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters of the transaction listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    /// Text to look for in the title, description or price.
    pub search: Option<String>,
    /// The 1-based page number.
    pub page: Option<i64>,
    /// The number of transactions per page.
    #[serde(alias = "perPage")]
    pub per_page: Option<i64>,
}

/// Get one page of the transactions matching the month and search text.
///
/// The month is optional here. When it is given, the search only looks at the
/// transactions sold in that month.
pub async fn get_transactions(
    State(state): State<TransactionsState>,
    MonthParam(month): MonthParam,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<PageResult<TransactionRecord>>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidQuery(rejection.body_text()))?;

    let month = month
        .as_deref()
        .filter(|month| !month.trim().is_empty())
        .map(MonthSelector::parse)
        .transpose()?;

    let page = PageRequest::new(
        query.page.unwrap_or(state.pagination_config.default_page),
        query
            .per_page
            .unwrap_or(state.pagination_config.default_page_size),
    )?;

    let filter = TransactionFilter::new(month, query.search.as_deref().unwrap_or_default());

    let result = state
        .record_store
        .query(&filter, page)
        .await
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Query, State, rejection::QueryRejection},
    };

    use crate::{
        Error, PaginationConfig, RecordStore,
        extract::MonthParam,
        test_utils::{record, unreachable_store},
    };

    use super::{ListingQuery, TransactionsState, get_transactions};

    fn state_with(store: RecordStore) -> TransactionsState {
        TransactionsState {
            record_store: store,
            pagination_config: PaginationConfig::default(),
        }
    }

    fn query(listing_query: ListingQuery) -> Result<Query<ListingQuery>, QueryRejection> {
        Ok(Query(listing_query))
    }

    fn many_records() -> RecordStore {
        RecordStore::in_memory(
            (1..=23)
                .map(|id| {
                    let date = if id % 2 == 0 { "2021-03-10" } else { "2021-04-10" };
                    record(id, &format!("Item {id}"), id as f64, "misc", Some(true), date)
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn uses_default_page_and_size() {
        let Json(got) = get_transactions(
            State(state_with(many_records())),
            MonthParam(None),
            query(ListingQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(got.items.len(), 10);
        assert_eq!(got.pagination.total_documents, 23);
        assert_eq!(got.pagination.total_pages, 3);
        assert_eq!(got.pagination.current_page, 1);
        assert_eq!(got.pagination.per_page, 10);
    }

    #[tokio::test]
    async fn month_restricts_the_search() {
        let Json(got) = get_transactions(
            State(state_with(many_records())),
            MonthParam(Some("March".to_owned())),
            query(ListingQuery {
                search: Some("item 1".to_owned()),
                page: None,
                per_page: Some(100),
            }),
        )
        .await
        .unwrap();

        let ids: Vec<_> = got.items.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![10, 12, 14, 16, 18]);
        assert_eq!(got.pagination.total_documents, 5);
    }

    #[tokio::test]
    async fn blank_month_lists_every_month() {
        let Json(got) = get_transactions(
            State(state_with(many_records())),
            MonthParam(Some(" ".to_owned())),
            query(ListingQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(got.pagination.total_documents, 23);
    }

    #[tokio::test]
    async fn rejects_bad_parameters_before_fetching() {
        let cases = [
            (Some("Smarch"), None, Error::InvalidMonth("Smarch".to_owned())),
            (None, Some(0), Error::InvalidPageSize(0)),
        ];

        for (month, per_page, want) in cases {
            let result = get_transactions(
                State(state_with(unreachable_store())),
                MonthParam(month.map(str::to_owned)),
                query(ListingQuery {
                    search: None,
                    page: None,
                    per_page,
                }),
            )
            .await;

            assert_eq!(result.err(), Some(want));
        }
    }
}
