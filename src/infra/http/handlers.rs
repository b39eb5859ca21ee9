//! Filtered-responses handlers.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::pagination::DEFAULT_PAGE_LIMIT;
use crate::application::responses::FilteredResponsePage;
use crate::domain::filters::FilterClause;

use super::error::ApiError;
use super::state::AppState;

/// GET `/forms/{form_id}/filteredResponses`.
///
/// `filters` is decoded here at the boundary; the service below only ever
/// sees parsed clauses. Every other query parameter (including `limit`)
/// is forwarded to the upstream verbatim.
pub async fn filtered_responses(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<FilteredResponsePage>, ApiError> {
    let clauses = parse_filters(params.remove("filters").as_deref())?;
    let limit = parse_limit(params.get("limit").map(String::as_str))?;
    let passthrough: Vec<(String, String)> = params.into_iter().collect();

    let page = state
        .responses
        .filtered_responses(&form_id, &clauses, limit, &passthrough)
        .await?;

    Ok(Json(page))
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

fn parse_filters(raw: Option<&str>) -> Result<Vec<FilterClause>, ApiError> {
    match raw {
        None | Some("") => Ok(Vec::new()),
        Some(raw) => {
            serde_json::from_str(raw).map_err(|err| ApiError::invalid_filters(err.to_string()))
        }
    }
}

fn parse_limit(raw: Option<&str>) -> Result<NonZeroU32, ApiError> {
    match raw {
        None | Some("") => Ok(DEFAULT_PAGE_LIMIT),
        Some(raw) => {
            let value: i64 = raw
                .parse()
                .map_err(|_| ApiError::invalid_limit(format!("`{raw}` is not an integer")))?;
            u32::try_from(value)
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or_else(|| ApiError::invalid_limit(format!("`{raw}` is not positive")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_empty_filters_mean_no_clauses() {
        assert!(parse_filters(None).expect("absent").is_empty());
        assert!(parse_filters(Some("")).expect("empty").is_empty());
        assert!(parse_filters(Some("[]")).expect("empty array").is_empty());
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(parse_filters(Some("{not json")).is_err());
        assert!(parse_filters(Some(r#"{"id": "a"}"#)).is_err());
    }

    #[test]
    fn limit_defaults_and_validates() {
        assert_eq!(parse_limit(None).expect("default").get(), 10);
        assert_eq!(parse_limit(Some("25")).expect("parsed").get(), 25);
        assert!(parse_limit(Some("0")).is_err());
        assert!(parse_limit(Some("-3")).is_err());
        assert!(parse_limit(Some("ten")).is_err());
    }
}
