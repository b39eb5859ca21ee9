//! Upstream forms API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamSettings;
use crate::domain::submissions::Submission;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}

/// Raw submissions payload from the upstream. Only `responses` matters to
/// the filter pass; the upstream's own pagination metadata is recomputed
/// over the filtered set.
#[derive(Debug, Deserialize)]
pub struct SubmissionsPage {
    #[serde(default)]
    pub responses: Vec<Submission>,
}

/// Boundary to the upstream forms API, a trait so tests can count calls
/// with a mock instead of a network.
#[async_trait]
pub trait SubmissionsApi: Send + Sync {
    async fn fetch_submissions(
        &self,
        form_id: &str,
        query: &[(String, String)],
    ) -> Result<SubmissionsPage, UpstreamError>;
}

/// Fillout-compatible client over reqwest with bearer authentication.
pub struct FilloutClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl FilloutClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()?;

        // `Url::join` treats the last path segment as a file unless the
        // base ends with a slash, which would swallow the form id.
        let mut base_url = settings.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("setaccio/", env!("CARGO_PKG_VERSION"))
    }

    fn submissions_url(&self, form_id: &str) -> Result<Url, UpstreamError> {
        Ok(self.base_url.join(&format!("{form_id}/submissions"))?)
    }
}

#[async_trait]
impl SubmissionsApi for FilloutClient {
    async fn fetch_submissions(
        &self,
        form_id: &str,
        query: &[(String, String)],
    ) -> Result<SubmissionsPage, UpstreamError> {
        let response = self
            .http
            .get(self.submissions_url(form_id)?)
            .query(query)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<SubmissionsPage>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn settings(base: &str) -> UpstreamSettings {
        UpstreamSettings {
            base_url: Url::parse(base).expect("base url"),
            api_key: "sk-test".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn submissions_url_keeps_every_base_path_segment() {
        let client = FilloutClient::new(&settings("https://api.fillout.com/v1/api/forms"))
            .expect("client");
        let url = client.submissions_url("abc123").expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.fillout.com/v1/api/forms/abc123/submissions"
        );
    }

    #[test]
    fn trailing_slash_base_is_equivalent() {
        let client = FilloutClient::new(&settings("https://api.fillout.com/v1/api/forms/"))
            .expect("client");
        let url = client.submissions_url("abc123").expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.fillout.com/v1/api/forms/abc123/submissions"
        );
    }

    #[test]
    fn submissions_page_tolerates_missing_responses() {
        let page: SubmissionsPage = serde_json::from_str("{}").expect("decode page");
        assert!(page.responses.is_empty());
    }
}
