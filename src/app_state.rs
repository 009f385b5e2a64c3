//! Implements a struct that holds the state of the REST server.

use crate::{dashboard::SoldPolicy, pagination::PaginationConfig, record::RecordStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Where the transaction records come from.
    pub record_store: RecordStore,

    /// How to decide whether a record counts as sold.
    pub sold_policy: SoldPolicy,

    /// The config that controls how to page the transaction listing.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] that serves records from `record_store`.
    pub fn new(
        record_store: RecordStore,
        sold_policy: SoldPolicy,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            record_store,
            sold_policy,
            pagination_config,
        }
    }
}
