//! HTTP client for the issue-positions backend.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

use spectrum_schema::{
    Chamber, EntityId, IssueSummary, MemberDetail, PositionsResponse, StatementEvidence,
    StatementsResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { status: u16, url: String },

    #[error("failed to decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Finds `issue` in the issue index by slug, falling back to the numeric id.
pub fn find_issue<'a>(index: &'a [IssueSummary], issue: &str) -> Option<&'a IssueSummary> {
    index
        .iter()
        .find(|summary| summary.slug == issue)
        .or_else(|| index.iter().find(|summary| summary.id == issue))
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/issues`
    pub async fn issues(&self) -> ApiResult<Vec<IssueSummary>> {
        self.get_json(&self.url("/api/issues"), &[]).await
    }

    /// `GET /api/issues/{issue}/positions?chamber={chamber}`
    pub async fn positions(
        &self,
        issue: &str,
        chamber: Option<Chamber>,
    ) -> ApiResult<PositionsResponse> {
        let url = self.url(&format!("/api/issues/{issue}/positions"));
        let query: Vec<(&str, &str)> = chamber
            .map(|chamber| vec![("chamber", chamber.as_query())])
            .unwrap_or_default();
        self.get_json(&url, &query).await
    }

    /// `GET /api/members/{id}`
    pub async fn member(&self, id: &EntityId) -> ApiResult<MemberDetail> {
        self.get_json(&self.url(&format!("/api/members/{id}")), &[])
            .await
    }

    /// `GET /api/members/{id}/statements`
    pub async fn statements(&self, id: &EntityId) -> ApiResult<Vec<StatementEvidence>> {
        let response: StatementsResponse = self
            .get_json(&self.url(&format!("/api/members/{id}/statements")), &[])
            .await?;
        Ok(response.statements)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> ApiResult<T> {
        trace!(target: "spectrum::api", url, "request.sent");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(target: "spectrum::api", url, status = status.as_u16(), "request.failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
