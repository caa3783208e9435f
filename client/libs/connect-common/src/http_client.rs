//! HTTP client for the remote API
//!
//! A single `perform` entry point: one attempt, no retries. Authenticated calls
//! carry `Authorization: Token <value>` when a token is held; a missing token is
//! left for the server to reject.

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};

/// Response type for endpoints whose body is irrelevant.
pub type Empty = IgnoredAny;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

/// Client for the connect-two REST API. Cheap to clone; clones share the token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<SecretString>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<SecretString>) {
        *self.token.write() = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Sends one request and decodes the JSON response body into `R`.
    pub async fn perform<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        requires_auth: bool,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, requires_auth, "api request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if requires_auth {
            request = self.authorize(request);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "api request did not complete");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = server_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            warn!(%method, %url, status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        // Some endpoints answer 204 or an empty 200.
        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(payload).map_err(|e| ApiError::Server {
            status: status.as_u16(),
            message: format!("Malformed response: {}", e),
        })
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, requires_auth: bool) -> Result<R> {
        self.perform::<(), R>(Method::GET, path, None, requires_auth)
            .await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B, requires_auth: bool) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.perform(Method::POST, path, Some(body), requires_auth)
            .await
    }

    pub async fn delete(&self, path: &str, requires_auth: bool) -> Result<()> {
        self.perform::<(), Empty>(Method::DELETE, path, None, requires_auth)
            .await
            .map(|_| ())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().as_ref() {
            Some(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", token.expose_secret()),
            ),
            None => request,
        }
    }
}

fn server_message(text: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(text).ok()?;
    body.error.or(body.detail).or(body.message)
}
