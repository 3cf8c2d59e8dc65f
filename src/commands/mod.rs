//! API Command Wrappers
//!
//! Client bindings to the backend routes, organized by domain.

mod crud;
mod review;
mod storage;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};
use crate::models::ApiResponse;

// Re-export all public items
pub use crud::*;
pub use review::*;
pub use storage::*;

/// Authenticated handle on one backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl ApiClient {
    pub fn new(base: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    /// Send a request and unwrap the envelope.
    ///
    /// Success envelopes without data decode as `None`.
    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&crate::models::ListQuery>,
        body: Option<&B>,
    ) -> ClientResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.token);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            log::warn!("undecodable response ({}): {}", status, e);
            ClientError::from_status(status, format!("Unexpected response ({})", status))
        })?;

        if status.is_success() && envelope.success {
            Ok(envelope.data)
        } else {
            let status = if status.is_success() {
                StatusCode::BAD_GATEWAY
            } else {
                status
            };
            Err(ClientError::from_status(status, envelope.message))
        }
    }

    /// Like `send`, but the envelope must carry data
    async fn fetch_data<B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&crate::models::ListQuery>,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(method, path, query, body)
            .await?
            .ok_or_else(|| ClientError::UpstreamFailure("Response carried no data".to_string()))
    }
}
