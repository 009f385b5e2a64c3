//! Application router configuration.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState,
    dashboard::{get_bar_chart, get_combined, get_pie_chart, get_statistics},
    endpoints,
    transaction::get_transactions,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::STATISTICS, get(get_statistics))
        .route(endpoints::STATISTICS_FOR_MONTH, get(get_statistics))
        .route(endpoints::BAR_CHART, get(get_bar_chart))
        .route(endpoints::BAR_CHART_FOR_MONTH, get(get_bar_chart))
        .route(endpoints::PIE_CHART, get(get_pie_chart))
        .route(endpoints::PIE_CHART_FOR_MONTH, get(get_pie_chart))
        .route(endpoints::COMBINED, get(get_combined))
        .route(endpoints::COMBINED_FOR_MONTH, get(get_combined))
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::TRANSACTIONS_FOR_MONTH, get(get_transactions))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("No route for {}", uri.path()) })),
    )
        .into_response()
}
