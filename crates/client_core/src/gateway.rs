use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use shared::{
    domain::InterviewId,
    error::ApiError,
    protocol::{InterviewFilter, InterviewRecord, OwnedInterviewRecord},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("invalid api base url '{0}'")]
    BadBaseUrl(String),
}

/// Remote operations the controllers depend on. The HTTP implementation is
/// the production one; tests substitute fakes.
#[async_trait]
pub trait InterviewGateway: Send + Sync {
    async fn list_interviews(
        &self,
        filter: &InterviewFilter,
    ) -> Result<Vec<InterviewRecord>, ApiFailure>;

    async fn list_owned_interviews(
        &self,
        token: &str,
    ) -> Result<Vec<OwnedInterviewRecord>, ApiFailure>;

    async fn delete_interview(
        &self,
        token: &str,
        interview_id: &InterviewId,
    ) -> Result<(), ApiFailure>;
}

pub struct HttpInterviewGateway {
    http: Client,
    base_url: Url,
}

impl HttpInterviewGateway {
    pub fn new(base_url: &str) -> Result<Self, ApiFailure> {
        Self::build(base_url, Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiFailure> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::build(base_url, http)
    }

    fn build(base_url: &str, http: Client) -> Result<Self, ApiFailure> {
        let base_url = Url::parse(base_url)
            .map_err(|_| ApiFailure::BadBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiFailure::BadBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// Joins path segments onto the base url; segments are percent-encoded,
    /// so opaque server ids are safe to splice in.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiFailure> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiFailure::BadBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ApiError>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(ApiFailure::Rejected { status, message })
    }
}

#[async_trait]
impl InterviewGateway for HttpInterviewGateway {
    async fn list_interviews(
        &self,
        filter: &InterviewFilter,
    ) -> Result<Vec<InterviewRecord>, ApiFailure> {
        let url = self.endpoint(&["interviews"])?;
        debug!(%url, "gateway: listing interviews");
        let response = self.http.get(url).query(filter).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_owned_interviews(
        &self,
        token: &str,
    ) -> Result<Vec<OwnedInterviewRecord>, ApiFailure> {
        let url = self.endpoint(&["interviews", "user-interviews"])?;
        debug!(%url, "gateway: listing owned interviews");
        let response = self.http.get(url).bearer_auth(token).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_interview(
        &self,
        token: &str,
        interview_id: &InterviewId,
    ) -> Result<(), ApiFailure> {
        let url = self.endpoint(&["interviews", interview_id.as_str()])?;
        debug!(%url, "gateway: deleting interview");
        let response = self.http.delete(url).bearer_auth(token).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
