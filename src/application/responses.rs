//! Filtered-responses service: cache lookup, upstream fetch, filter pass.

use std::num::NonZeroU32;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::error::AppError;
use crate::application::{filter, pagination};
use crate::cache::{ResponseStore, response_cache_key};
use crate::domain::filters::FilterClause;
use crate::domain::submissions::Submission;
use crate::infra::upstream::SubmissionsApi;

/// Result page returned to the caller, identical in shape whether it was
/// computed fresh or served from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResponsePage {
    pub responses: Vec<Submission>,
    pub total_responses: u64,
    pub page_count: u64,
}

/// Orchestrates the one non-trivial request path of the proxy.
///
/// The filter engine never sees the cache and the cache never sees filter
/// semantics; they meet only here. The cache is an optimization: it is
/// consulted before the upstream and written after a successful filter
/// pass, and its absence (disabled via configuration) changes nothing but
/// latency.
pub struct ResponseService {
    upstream: Arc<dyn SubmissionsApi>,
    cache: Option<Arc<ResponseStore>>,
}

impl ResponseService {
    pub fn new(upstream: Arc<dyn SubmissionsApi>, cache: Option<Arc<ResponseStore>>) -> Self {
        Self { upstream, cache }
    }

    /// Serve one filtered-responses request.
    ///
    /// `passthrough` carries every query parameter except `filters`
    /// (including `limit`) and is forwarded to the upstream verbatim.
    #[instrument(skip_all, fields(form_id = %form_id, clauses = clauses.len()))]
    pub async fn filtered_responses(
        &self,
        form_id: &str,
        clauses: &[FilterClause],
        limit: NonZeroU32,
        passthrough: &[(String, String)],
    ) -> Result<FilteredResponsePage, AppError> {
        let key = response_cache_key(form_id, clauses)
            .map_err(|err| AppError::unexpected(format!("cache key serialization: {err}")))?;

        if let Some(cache) = &self.cache
            && let Some(page) = cache.get(&key)
        {
            debug!(cache = "responses", outcome = "hit", "serving cached page");
            return Ok(page);
        }
        debug!(cache = "responses", outcome = "miss", "fetching from upstream");

        let fetched = self
            .upstream
            .fetch_submissions(form_id, passthrough)
            .await
            .map_err(AppError::Upstream)?;

        let responses = filter::apply(&fetched.responses, clauses);
        let total = responses.len() as u64;
        let page = FilteredResponsePage {
            responses,
            total_responses: total,
            page_count: pagination::page_count(total, limit),
        };

        if let Some(cache) = &self.cache {
            cache.set(key, page.clone());
        }
        Ok(page)
    }
}
