//! The API endpoints URIs.
//!
//! Every month-scoped view is served both with the month as a query parameter,
//! e.g. '/api/statistics?month=March', and as a path segment, e.g.
//! '/api/statistics/{month}'. Use [format_endpoint] to fill in the parameter.

/// The route for the sales statistics of a month.
pub const STATISTICS: &str = "/api/statistics";
/// The route for the sales statistics of the month in the path.
pub const STATISTICS_FOR_MONTH: &str = "/api/statistics/{month}";
/// The route for the price histogram of a month.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for the price histogram of the month in the path.
pub const BAR_CHART_FOR_MONTH: &str = "/api/bar-chart/{month}";
/// The route for the category breakdown of a month.
pub const PIE_CHART: &str = "/api/pie-chart";
/// The route for the category breakdown of the month in the path.
pub const PIE_CHART_FOR_MONTH: &str = "/api/pie-chart/{month}";
/// The route for the statistics, histogram and category breakdown in one response.
pub const COMBINED: &str = "/api/combined";
/// The route for the combined views of the month in the path.
pub const COMBINED_FOR_MONTH: &str = "/api/combined/{month}";
/// The route for the searchable, paginated transaction listing.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the transaction listing of the month in the path.
pub const TRANSACTIONS_FOR_MONTH: &str = "/api/transactions/{month}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/statistics/{month}', '{month}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::STATISTICS);
        assert_endpoint_is_valid_uri(endpoints::STATISTICS_FOR_MONTH);
        assert_endpoint_is_valid_uri(endpoints::BAR_CHART);
        assert_endpoint_is_valid_uri(endpoints::BAR_CHART_FOR_MONTH);
        assert_endpoint_is_valid_uri(endpoints::PIE_CHART);
        assert_endpoint_is_valid_uri(endpoints::PIE_CHART_FOR_MONTH);
        assert_endpoint_is_valid_uri(endpoints::COMBINED);
        assert_endpoint_is_valid_uri(endpoints::COMBINED_FOR_MONTH);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_FOR_MONTH);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::STATISTICS_FOR_MONTH, "March");

        assert_eq!(formatted_path, "/api/statistics/March");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", "3");

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", "3");

        assert_eq!(formatted_path, "/hello/3/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
