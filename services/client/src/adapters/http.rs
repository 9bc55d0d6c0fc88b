//! services/client/src/adapters/http.rs
//!
//! The shared HTTP client every backend adapter goes through. It attaches the
//! persisted bearer token to each request and turns failures into `PortError`s
//! carrying either the backend's `detail` message or the caller's fallback.

use idea_notes_core::ports::{CredentialStore, PortError, PortResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::adapters::records::ErrorBody;
use crate::error::ClientError;

//=========================================================================================
// The Main Client Struct
//=========================================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Creates a new `ApiClient` for the backend at `base_url`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Starts a request to `path`, with the bearer token attached when one is stored.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match self.credentials.load() {
            Some(credential) => builder.bearer_auth(credential.access_token),
            None => builder,
        }
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> PortResult<T> {
        let response = self.send(builder, fallback).await?;
        response.json::<T>().await.map_err(|e| {
            error!("Failed to decode backend response: {}", e);
            PortError::Unexpected(fallback.to_string())
        })
    }

    /// Sends the request and ignores the body of a successful response.
    pub async fn send_empty(&self, builder: RequestBuilder, fallback: &str) -> PortResult<()> {
        self.send(builder, fallback).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder, fallback: &str) -> PortResult<Response> {
        let response = builder.send().await.map_err(|e| {
            error!("Request to backend failed: {}", e);
            PortError::Unavailable(fallback.to_string())
        })?;

        let status = response.status();
        debug!(%status, url = %response.url(), "Backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail_text().map(str::to_string))
            .unwrap_or_else(|| fallback.to_string());

        Err(self.rejection(status, message))
    }

    fn rejection(&self, status: StatusCode, message: String) -> PortError {
        match status {
            StatusCode::UNAUTHORIZED => {
                // The token is no longer accepted: drop it so the next run starts logged out.
                warn!("Backend rejected the stored credential; clearing it");
                self.credentials.clear();
                PortError::Unauthorized(message)
            }
            StatusCode::NOT_FOUND => PortError::NotFound(message),
            _ => {
                warn!(status = status.as_u16(), "Backend returned an error: {}", message);
                PortError::Rejected {
                    status: status.as_u16(),
                    detail: message,
                }
            }
        }
    }
}
