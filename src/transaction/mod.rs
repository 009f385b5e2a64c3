//! The transaction listing of the dashboard.
//!
//! This module contains:
//! - The `TransactionFilter` that matches records against a month and search text
//! - The handler that serves one page of matching transactions

mod listing;
mod search;

pub use listing::get_transactions;
pub use search::{TransactionFilter, search_records};
