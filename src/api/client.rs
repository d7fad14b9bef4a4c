use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::models::{MarksUpdate, Student, StudentDraft};

use super::error::ApiError;

/// Thin wrapper over `reqwest` for the three roster endpoints. Each call
/// returns the server's record so the caller can reconcile local state with it.
#[derive(Debug, Clone)]
pub struct RosterClient {
    http: Client,
    base_url: Url,
}

impl RosterClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|source| ApiError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/students`
    pub async fn fetch_students(&self) -> Result<Vec<Student>, ApiError> {
        let url = self.endpoint(&["api", "students"])?;
        let request = self.http.request(Method::GET, url.clone());
        self.send_json(url, request).await
    }

    /// `POST /api/students`
    pub async fn create_student(&self, draft: &StudentDraft) -> Result<Student, ApiError> {
        let url = self.endpoint(&["api", "students"])?;
        let request = self.http.request(Method::POST, url.clone()).json(draft);
        self.send_json(url, request).await
    }

    /// `PUT /api/students/{student_id}/marks`
    pub async fn update_marks(&self, update: &MarksUpdate) -> Result<Student, ApiError> {
        let url = self.endpoint(&["api", "students", &update.student_id, "marks"])?;
        let request = self
            .http
            .request(Method::PUT, url.clone())
            .json(&update.payload());
        self.send_json(url, request).await
    }

    /// Append path segments to the base URL. Segments are percent-encoded, so
    /// an id containing `/` stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: Url,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "sending roster request");
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        read_json(url, response).await
    }
}

async fn read_json<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response.json::<T>().await.map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
