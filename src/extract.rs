//! Request extractors shared by the dashboard and transaction handlers.

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::Error;

#[derive(Debug, Deserialize)]
struct MonthQuery {
    month: Option<String>,
}

/// The raw month requested by the client, if any.
///
/// Taken from the `{month}` path segment when the route has one, otherwise
/// from the `month` query parameter. The value is validated by
/// [crate::MonthSelector] so that callers decide whether a month is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthParam(pub Option<String>);

impl<S> FromRequestParts<S> for MonthParam
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Path(month)) = Path::<String>::from_request_parts(parts, state).await {
            return Ok(Self(Some(month)));
        }

        let month = Query::<MonthQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.month);

        Ok(Self(month))
    }
}
