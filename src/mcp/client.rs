//! HTTP client for a running tend server.
//!
//! Configuration is via environment variables:
//! - `TEND_URL` - Base URL (default: `http://localhost:3000/api/v1`)
//! - `TEND_API_KEY` - API key, when the server requires one

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Default URL for a local server.
const DEFAULT_URL: &str = "http://localhost:3000/api/v1";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct TendClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl TendClient {
    pub fn from_env() -> Self {
        let base_url = std::env::var("TEND_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let api_key = std::env::var("TEND_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            _ => ClientError::Server(format!("{}: {}", status, body)),
        })
    }

    pub async fn list_households(&self) -> Result<Vec<Household>, ClientError> {
        let response = self.request(Method::GET, "/households").send().await?;
        self.handle_response(response).await
    }

    pub async fn list_todos(&self, household_id: Uuid) -> Result<Vec<Todo>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/households/{}/todos", household_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_schedule(
        &self,
        household_id: Uuid,
        radius_days: u32,
    ) -> Result<Vec<ScheduleEntry>, ClientError> {
        let response = self
            .request(
                Method::GET,
                &format!("/households/{}/schedule", household_id),
            )
            .query(&[("radius", radius_days)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn log_care(
        &self,
        household_id: Uuid,
        input: &CreateCareInput,
    ) -> Result<Care, ClientError> {
        let response = self
            .request(Method::POST, &format!("/households/{}/cares", household_id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
