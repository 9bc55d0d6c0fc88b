//! services/client/src/adapters/auth.rs
//!
//! Implements the `AuthService` port against `/api/auth`.

use async_trait::async_trait;
use idea_notes_core::domain::{AccessToken, Credentials, StoredCredential, User};
use idea_notes_core::ports::{AuthService, PortError, PortResult};
use reqwest::Method;
use tracing::{error, info};

use crate::adapters::http::ApiClient;
use crate::adapters::records::{CredentialsRecord, TokenRecord, UserRecord};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const CURRENT_USER_FAILED: &str = "Failed to load the current user";

#[derive(Clone)]
pub struct HttpAuthAdapter {
    api: ApiClient,
}

impl HttpAuthAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    /// Logs in with a form-encoded body and persists the returned token.
    async fn login(&self, credentials: &Credentials) -> PortResult<AccessToken> {
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let builder = self.api.request(Method::POST, "/api/auth/login").form(&form);
        let token = self
            .api
            .send_json::<TokenRecord>(builder, LOGIN_FAILED)
            .await?
            .to_domain();

        self.api
            .credentials()
            .save(&StoredCredential {
                access_token: token.access_token.clone(),
                username: Some(credentials.username.clone()),
            })
            .map_err(|e| {
                error!("Failed to persist credential: {}", e);
                PortError::Unexpected(format!("{LOGIN_FAILED}: {e}"))
            })?;
        info!(username = %credentials.username, "Credential stored");
        Ok(token)
    }

    async fn register(&self, credentials: &Credentials) -> PortResult<User> {
        let builder = self
            .api
            .request(Method::POST, "/api/auth/register")
            .json(&CredentialsRecord {
                username: &credentials.username,
                password: &credentials.password,
            });
        let user = self
            .api
            .send_json::<UserRecord>(builder, REGISTER_FAILED)
            .await?;
        Ok(user.to_domain())
    }

    async fn current_user(&self) -> PortResult<User> {
        let builder = self.api.request(Method::GET, "/api/auth/me");
        let user = self
            .api
            .send_json::<UserRecord>(builder, CURRENT_USER_FAILED)
            .await?;
        Ok(user.to_domain())
    }

    fn logout(&self) {
        self.api.credentials().clear();
    }
}
