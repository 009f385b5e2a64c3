//! Dashboard module
//!
//! Provides the monthly views of the dashboard: sales statistics, a histogram
//! of sold items by price and a breakdown of items by category.

mod aggregation;
mod handlers;

pub use aggregation::{
    CategoryCount, PriceHistogram, SaleMode, SoldPolicy, StatisticsSummary, count_by_category,
    summarize_sales,
};
pub use handlers::{get_bar_chart, get_combined, get_pie_chart, get_statistics};
