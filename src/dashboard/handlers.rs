//! Dashboard HTTP handlers.
//!
//! Each handler validates the month before touching the record store, fetches
//! one snapshot of the records, filters it to the month and hands it to the
//! aggregation functions.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Serialize;

use crate::{
    AppState, Error,
    dashboard::aggregation::{
        CategoryCount, PriceHistogram, SaleMode, SoldPolicy, StatisticsSummary, count_by_category,
        summarize_sales,
    },
    extract::MonthParam,
    month::{MonthSelector, filter_by_month},
    record::{RecordStore, TransactionRecord},
};

/// The state needed for the dashboard views.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Where the transaction records come from.
    pub record_store: RecordStore,
    /// How to decide whether a record counts as sold.
    pub sold_policy: SoldPolicy,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            record_store: state.record_store.clone(),
            sold_policy: state.sold_policy,
        }
    }
}

/// The statistics, histogram and category breakdown of one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedView {
    statistics: StatisticsSummary,
    bar_chart_data: PriceHistogram,
    pie_chart_data: Vec<CategoryCount>,
}

/// The records of one month and how to tell which of them sold.
struct MonthSnapshot {
    records: Vec<TransactionRecord>,
    sale_mode: SaleMode,
}

/// Fetches the records for the month requested in `month`.
///
/// # Errors
/// Returns [Error::MissingMonth] or [Error::InvalidMonth] without fetching
/// anything if the month is bad, otherwise any error from the record store.
async fn load_month(state: &DashboardState, month: Option<&str>) -> Result<MonthSnapshot, Error> {
    let month = MonthSelector::from_param(month)?;

    let records = state
        .record_store
        .fetch_all()
        .await
        .inspect_err(|error| tracing::error!("could not fetch records for {month}: {error}"))?;

    let sale_mode = state.sold_policy.resolve(&records);
    let records = filter_by_month(records, month);
    tracing::debug!("{} records in {month}, {sale_mode:?}", records.len());

    Ok(MonthSnapshot { records, sale_mode })
}

/// Get the total sale amount and the number of sold and unsold items in a month.
pub async fn get_statistics(
    State(state): State<DashboardState>,
    MonthParam(month): MonthParam,
) -> Result<Json<StatisticsSummary>, Error> {
    let snapshot = load_month(&state, month.as_deref()).await?;

    Ok(Json(summarize_sales(&snapshot.records, snapshot.sale_mode)))
}

/// Get the number of items sold in each price band in a month.
pub async fn get_bar_chart(
    State(state): State<DashboardState>,
    MonthParam(month): MonthParam,
) -> Result<Json<PriceHistogram>, Error> {
    let snapshot = load_month(&state, month.as_deref()).await?;

    Ok(Json(PriceHistogram::from_records(
        &snapshot.records,
        snapshot.sale_mode,
    )))
}

/// Get the number of items in each category in a month.
pub async fn get_pie_chart(
    State(state): State<DashboardState>,
    MonthParam(month): MonthParam,
) -> Result<Json<Vec<CategoryCount>>, Error> {
    let snapshot = load_month(&state, month.as_deref()).await?;

    Ok(Json(count_by_category(&snapshot.records)))
}

/// Get the statistics, bar chart and pie chart of a month in one response.
///
/// All three views are computed from the same snapshot of the record store.
pub async fn get_combined(
    State(state): State<DashboardState>,
    MonthParam(month): MonthParam,
) -> Result<Json<CombinedView>, Error> {
    let MonthSnapshot { records, sale_mode } = load_month(&state, month.as_deref()).await?;

    Ok(Json(CombinedView {
        statistics: summarize_sales(&records, sale_mode),
        bar_chart_data: PriceHistogram::from_records(&records, sale_mode),
        pie_chart_data: count_by_category(&records),
    }))
}
