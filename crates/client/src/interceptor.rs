//! Authenticated API client.
//!
//! Every request goes through [`ApiClient::send`], which enforces the
//! outbound/inbound contract:
//! - a stored bearer token is attached as `Authorization: Bearer <token>`
//! - `401` clears the session (token included) and navigates to the login page
//! - `403` is reported as [`ApiError::Forbidden`] and leaves the session alone
//! - every other failure is logged and returned unchanged
//!
//! There is no refresh-token flow, so a `401` is never retried.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use storefront_auth::Redirect;
use storefront_auth::landing::GUEST_LOGIN;

use crate::auth_flow::ProfileFetcher;
use crate::config::ClientConfig;
use crate::error::{ApiError, extract_message};
use crate::navigation::Navigator;
use crate::store::SessionStore;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    profile_path: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            profile_path: config.profile_path.clone(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request against the API. Auth is attached by [`send`](Self::send).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Attach the stored bearer token, if there is one.
    pub fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = self.authorize(req).send().await.map_err(|e| {
            tracing::warn!("request failed: {e}");
            ApiError::Network(e.to_string())
        })?;

        self.inspect(resp).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(method, path).json(body)).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn inspect(&self, resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let url = resp.url().path().to_string();
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!(%url, "401 from API; clearing session");
                self.invalidate_session();
                Err(ApiError::Unauthenticated)
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!(%url, %message, "403 from API");
                Err(ApiError::Forbidden { message })
            }
            _ => {
                tracing::error!(%url, status = status.as_u16(), %message, "API error");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Drop the token and session and send the user to the login page.
    pub fn invalidate_session(&self) {
        self.session.clear_token();
        self.session.logout();
        self.navigator.navigate(Redirect::to(GUEST_LOGIN));
    }
}

#[async_trait]
impl ProfileFetcher for ApiClient {
    async fn current_user(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json(&self.profile_path).await
    }
}
