//! Sales dashboard is a JSON API over a feed of product transactions.
//!
//! The API serves the views a sales dashboard needs for a single calendar
//! month: sales statistics, a price-range histogram, a category breakdown and
//! a searchable, paginated listing of the month's transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod dashboard;
pub mod endpoints;
mod extract;
mod logging;
mod month;
mod pagination;
mod record;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use dashboard::{
    CategoryCount, PriceHistogram, SaleMode, SoldPolicy, StatisticsSummary, count_by_category,
    summarize_sales,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::{MonthSelector, filter_by_month};
pub use pagination::{PageRequest, PageResult, Pagination, PaginationConfig, paginate};
pub use record::{
    DEFAULT_DATA_URL, Rating, RecordId, RecordStore, RemoteFeed, TransactionRecord,
    create_record_table as initialize_db, load_records_from_file, replace_all_records,
};
pub use routing::build_router;
pub use transaction::{TransactionFilter, search_records};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A month-scoped view was requested without a month.
    #[error("no month was provided")]
    MissingMonth,

    /// The month is neither an English month name nor a number from 1 to 12.
    ///
    /// Holds the month text exactly as the client sent it.
    #[error("\"{0}\" is not a valid month")]
    InvalidMonth(String),

    /// The requested page size was zero or negative.
    #[error("page size must be greater than zero, got {0}")]
    InvalidPageSize(i64),

    /// The requested page number was below one.
    #[error("page number must be at least one, got {0}")]
    InvalidPage(i64),

    /// The query string could not be read, e.g. a page number that is not an
    /// integer.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    /// The record store could not supply the transaction records.
    ///
    /// The string describes the underlying failure and should only be logged
    /// on the server. Clients get a generic message instead.
    #[error("the record source is unavailable: {0}")]
    SourceUnavailable(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SourceUnavailable(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        tracing::error!("could not fetch the transaction feed: {}", value);
        Error::SourceUnavailable(value.to_string())
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingMonth
            | Error::InvalidMonth(_)
            | Error::InvalidPageSize(_)
            | Error::InvalidPage(_)
            | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::SourceUnavailable(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            Error::MissingMonth => {
                "Please provide a month between January to December".to_owned()
            }
            Error::InvalidMonth(month) => {
                format!("Invalid month \"{month}\" provided. Please provide a valid month.")
            }
            Error::InvalidPageSize(_) | Error::InvalidPage(_) | Error::InvalidQuery(_) => {
                self.to_string()
            }
            Error::SourceUnavailable(_) => {
                "Failed to fetch sales data from the data source".to_owned()
            }
            Error::DatabaseLockError => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
