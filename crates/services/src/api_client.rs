//! HTTP client for the exam-prep backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use prep_core::model::{ClientSettings, NewTest, NewTestDraft, SubmissionResponse, Test, TestId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::stores::AuthService;

/// Where the backend lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            base_url: settings.api_base_url().to_string(),
        }
    }
}

/// Thin wrapper over the backend endpoints. Requests are sent once; failures
/// are logged and returned to the caller.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Option<Arc<AuthService>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    /// Attach the auth store whose token is sent as a bearer header.
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or other `ApiError`s
    /// when the request fails.
    pub async fn get_test(&self, id: TestId) -> Result<Test, ApiError> {
        let request = self.client.get(self.url(&format!("/tests/{id}")));
        self.fetch_json("get_test", request).await
    }

    /// Most recently generated tests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request fails.
    pub async fn recent_tests(&self, limit: u32) -> Result<Vec<Test>, ApiError> {
        let request = self
            .client
            .get(self.url("/tests/recent"))
            .query(&[("limit", limit)]);
        self.fetch_json("recent_tests", request).await
    }

    /// Validate `draft` and ask the backend to generate a test from it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the draft is rejected locally,
    /// or other `ApiError`s when the request fails.
    pub async fn generate_test(&self, draft: NewTestDraft) -> Result<Test, ApiError> {
        let body = draft.validate()?;
        self.generate_validated(&body).await
    }

    /// # Errors
    ///
    /// Returns `ApiError` when the request fails.
    pub async fn generate_validated(&self, body: &NewTest) -> Result<Test, ApiError> {
        let request = self.client.post(self.url("/tests/generate")).json(body);
        self.fetch_json("generate_test", request).await
    }

    /// Submit answers keyed by the 0-based question index as a string.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request fails.
    pub async fn submit_answers(
        &self,
        id: TestId,
        answers: &BTreeMap<String, String>,
    ) -> Result<SubmissionResponse, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/tests/{id}/submit")))
            .json(answers);
        self.fetch_json("submit_answers", request).await
    }

    /// PDF report of a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request fails.
    pub async fn download_results_report(
        &self,
        id: TestId,
        score: u8,
        feedback: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let request = self
            .client
            .get(self.url(&format!("/reports/{id}/results/download")))
            .query(&[("score", score.to_string().as_str()), ("feedback", feedback)]);
        self.fetch_bytes("download_results_report", request).await
    }

    /// Printable PDF of the test itself.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when the request fails.
    pub async fn download_test_pdf(&self, id: TestId) -> Result<Vec<u8>, ApiError> {
        let request = self.client.get(self.url(&format!("/reports/{id}/download")));
        self.fetch_bytes("download_test_pdf", request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match self.auth.as_ref().and_then(|auth| auth.token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        debug!(operation, "sending request");

        let response = request.send().await.map_err(|err| {
            error!(operation, error = %err, "request failed");
            ApiError::Http(err)
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                error!(operation, "resource not found");
                Err(ApiError::NotFound)
            }
            status => {
                error!(operation, %status, "unexpected status");
                Err(ApiError::HttpStatus(status))
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(operation, request).await?;
        response.json().await.map_err(|err| {
            error!(operation, error = %err, "failed to decode response");
            ApiError::Http(err)
        })
    }

    async fn fetch_bytes(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self.send(operation, request).await?;
        let bytes = response.bytes().await.map_err(|err| {
            error!(operation, error = %err, "failed to read response body");
            ApiError::Http(err)
        })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_point_at_local_backend() {
        let config = ApiConfig::from_settings(&ClientSettings::default());
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://example.test/api/".into(),
        });
        assert_eq!(client.base_url(), "http://example.test/api");
        assert_eq!(client.url("/tests/recent"), "http://example.test/api/tests/recent");
    }
}
