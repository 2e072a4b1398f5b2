//! Auth completion handshake.
//!
//! The external auth provider redirects to `/auth-success?token=...`. The
//! flow stores the token, fetches the current user, installs it in the session
//! store and redirects by role:
//!
//! ```text
//! AwaitingToken ──no token──────────────────────────▶ Failure (NoToken)
//!       │
//!       ▼
//! FetchingProfile ──fetch error / bad role──────────▶ Failure (AuthFailed)
//!       │
//!       ▼
//!    Success ──▶ /admin/dashboard | /customer/home
//! ```
//!
//! On failure the token written during `FetchingProfile` is replaced by the
//! token that was stored before the attempt (or removed if there was none).
//! A repeat firing with the token of the most recent attempt returns
//! [`AuthOutcome::AlreadyHandled`] without side effects.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use storefront_auth::landing::{login_with_error, post_login_route};
use storefront_auth::{ProfileError, Redirect, RoleId, UserProfile};

use crate::error::ApiError;
use crate::navigation::Navigator;
use crate::store::SessionStore;

/// "Get current user" collaborator.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn current_user(&self) -> Result<serde_json::Value, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStage {
    AwaitingToken,
    FetchingProfile,
    Success,
    Failure,
}

#[derive(Debug, Error)]
pub enum AuthFlowError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("profile fetch failed: {0}")]
    Fetch(#[from] ApiError),
}

impl AuthFlowError {
    /// Value of the `error` query parameter on the login redirect.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthFlowError::MissingToken => "NoToken",
            AuthFlowError::InvalidProfile(_) | AuthFlowError::Fetch(_) => "AuthFailed",
        }
    }
}

#[derive(Debug)]
pub enum AuthOutcome {
    Success { role: RoleId, destination: String },
    Failure { error: AuthFlowError, destination: String },
    AlreadyHandled,
}

impl AuthOutcome {
    pub fn destination(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success { destination, .. } | AuthOutcome::Failure { destination, .. } => {
                Some(destination)
            }
            AuthOutcome::AlreadyHandled => None,
        }
    }

    /// Terminal stage reached by this attempt; `None` for a suppressed repeat.
    pub fn stage(&self) -> Option<AuthStage> {
        match self {
            AuthOutcome::Success { .. } => Some(AuthStage::Success),
            AuthOutcome::Failure { .. } => Some(AuthStage::Failure),
            AuthOutcome::AlreadyHandled => None,
        }
    }
}

pub struct AuthCompletion {
    session: Arc<SessionStore>,
    fetcher: Arc<dyn ProfileFetcher>,
    navigator: Arc<dyn Navigator>,
    last_token: Mutex<Option<String>>,
}

impl AuthCompletion {
    pub fn new(
        session: Arc<SessionStore>,
        fetcher: Arc<dyn ProfileFetcher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            fetcher,
            navigator,
            last_token: Mutex::new(None),
        }
    }

    /// Run the flow for a redirect URL (absolute, or a path with query).
    pub async fn complete_from_url(&self, redirect_url: &str) -> AuthOutcome {
        self.complete(token_from_url(redirect_url).as_deref()).await
    }

    pub async fn complete(&self, token: Option<&str>) -> AuthOutcome {
        tracing::debug!(stage = ?AuthStage::AwaitingToken, "auth completion");

        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return self.fail(AuthFlowError::MissingToken, None);
        };

        if !self.claim(token) {
            tracing::debug!("auth completion already handled for this token");
            return AuthOutcome::AlreadyHandled;
        }

        tracing::debug!(stage = ?AuthStage::FetchingProfile, "auth completion");
        let previous = self.session.token();
        self.session.set_token(token);

        let profile = match self.fetcher.current_user().await {
            Ok(raw) => UserProfile::signed_in_from_json(&raw).map_err(AuthFlowError::from),
            Err(err) => Err(AuthFlowError::from(err)),
        };

        match profile {
            Ok(user) => {
                let role = user.role();
                self.session.set_user(user);

                let destination = post_login_route(role).to_string();
                tracing::info!(%role, %destination, "auth completion succeeded");
                self.navigator.navigate(Redirect::to(destination.clone()));
                AuthOutcome::Success { role, destination }
            }
            Err(error) => self.fail(error, Some(Rollback { written: token, previous })),
        }
    }

    fn fail(&self, error: AuthFlowError, rollback: Option<Rollback<'_>>) -> AuthOutcome {
        // Undo only our own write: if something else replaced or cleared the
        // token meanwhile (e.g. a 401 during the fetch), leave it alone.
        if let Some(Rollback { written, previous }) = rollback {
            if self.session.token().as_deref() == Some(written) {
                match previous {
                    Some(previous) => self.session.set_token(&previous),
                    None => self.session.clear_token(),
                }
            }
        }

        let destination = login_with_error(error.reason_code());
        tracing::warn!(%destination, "auth completion failed: {error}");
        self.navigator.navigate(Redirect::to(destination.clone()));
        AuthOutcome::Failure { error, destination }
    }

    /// Record `token` as the latest attempt. Returns `false` if it already was.
    fn claim(&self, token: &str) -> bool {
        let Ok(mut last) = self.last_token.lock() else {
            return false;
        };
        if last.as_deref() == Some(token) {
            return false;
        }
        *last = Some(token.to_string());
        true
    }
}

/// Token state to restore when an attempt fails after writing its token.
struct Rollback<'a> {
    written: &'a str,
    previous: Option<String>,
}

/// Extract the `token` query parameter from a redirect URL or path.
pub fn token_from_url(redirect_url: &str) -> Option<String> {
    let url = Url::parse(redirect_url)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(redirect_url)))
        .ok()?;

    url.query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
}
