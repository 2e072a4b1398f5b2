//! Session store: the single source of truth for who is acting and under
//! which role.
//!
//! One instance is created by the composition root and shared by reference
//! (`Arc<SessionStore>`) with the guards, the request interceptor and the auth
//! completion flow. Every mutation writes through to [`DurableStorage`] before
//! it returns, then notifies subscribers.
//!
//! Mutations are last-write-wins; there is no lock spanning a read-modify-write.

use std::sync::Arc;

use tokio::sync::watch;

use storefront_auth::{RoleId, Session, UserProfile};

use crate::storage::{DurableStorage, MemoryStorage, keys};

/// Resolves a profile for a role selected locally (`login` / `switch_role`).
///
/// Only called for non-guest roles.
pub trait UserDirectory: Send + Sync {
    fn resolve(&self, role: RoleId) -> UserProfile;
}

/// Stand-in directory that synthesizes a profile per role.
///
/// Real sessions come from the server profile installed by the auth completion
/// flow; this exists for local role switching and demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDirectory;

impl UserDirectory for PlaceholderDirectory {
    fn resolve(&self, role: RoleId) -> UserProfile {
        let slug = role.code().to_ascii_lowercase();
        UserProfile {
            id: format!("placeholder-{slug}"),
            email: Some(format!("{slug}@storefront.local")),
            full_name: Some(role.label().to_string()),
            role_code: role,
        }
    }
}

pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    directory: Arc<dyn UserDirectory>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Rebuild the session from durable storage.
    ///
    /// A missing or unreadable role yields a guest session. A persisted profile
    /// is reused when its role matches the persisted role; otherwise the
    /// directory resolves one.
    pub fn restore(storage: Arc<dyn DurableStorage>, directory: Arc<dyn UserDirectory>) -> Self {
        let session = load_session(storage.as_ref(), directory.as_ref());
        tracing::info!(role = %session.current_role(), "session restored");

        let (state, _) = watch::channel(session);
        Self {
            storage,
            directory,
            state,
        }
    }

    /// Fresh store over in-memory storage with the placeholder directory.
    pub fn in_memory() -> Self {
        Self::restore(Arc::new(MemoryStorage::new()), Arc::new(PlaceholderDirectory))
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn current_role(&self) -> RoleId {
        self.state.borrow().current_role()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().current_user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver that observes every change to the session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Act as `role`. Logging in as `Guest` is equivalent to [`logout`](Self::logout).
    pub fn login(&self, role: RoleId) {
        if role.is_guest() {
            self.logout();
            return;
        }

        let session = Session::for_user(self.directory.resolve(role));
        self.persist(&session);
        self.publish(session);
        tracing::info!(%role, "logged in");
    }

    /// Like [`login`](Self::login), logging the transition. Switching to
    /// `Guest` is a plain logout.
    pub fn switch_role(&self, role: RoleId) {
        let from = self.current_role();
        self.login(role);
        if !role.is_guest() {
            tracing::info!(%from, to = %role, "role switched");
        }
    }

    /// Reset to guest and clear the persisted role, profile and token.
    pub fn logout(&self) {
        for key in [keys::ROLE, keys::USER, keys::TOKEN] {
            if let Err(err) = self.storage.remove(key) {
                tracing::error!(key, "failed to clear persisted session key: {err}");
            }
        }
        if self.publish(Session::guest()) {
            tracing::info!("logged out");
        }
    }

    /// Install a server-resolved profile; the role comes from `role_code`.
    pub fn set_user(&self, user: UserProfile) {
        if user.role().is_guest() {
            tracing::warn!(user_id = %user.id, "profile carries guest role; treating as logout");
            self.logout();
            return;
        }

        let session = Session::for_user(user);
        self.persist(&session);
        tracing::info!(role = %session.current_role(), "user installed");
        self.publish(session);
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(keys::TOKEN).filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) {
        if let Err(err) = self.storage.set(keys::TOKEN, token) {
            tracing::error!("failed to persist bearer token: {err}");
        }
    }

    pub fn clear_token(&self) {
        if let Err(err) = self.storage.remove(keys::TOKEN) {
            tracing::error!("failed to clear bearer token: {err}");
        }
    }

    fn persist(&self, session: &Session) {
        if let Err(err) = self.storage.set(keys::ROLE, session.current_role().code()) {
            tracing::error!("failed to persist role: {err}");
        }

        let Some(user) = session.current_user() else {
            return;
        };
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.storage.set(keys::USER, &raw) {
                    tracing::error!("failed to persist user profile: {err}");
                }
            }
            Err(err) => tracing::error!("failed to serialize user profile: {err}"),
        }
    }

    /// Replace the session, notifying subscribers only when it changed.
    fn publish(&self, next: Session) -> bool {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }
}

fn load_session(storage: &dyn DurableStorage, directory: &dyn UserDirectory) -> Session {
    let role = match storage.get(keys::ROLE) {
        None => RoleId::Guest,
        Some(raw) => raw.parse().unwrap_or_else(|err| {
            tracing::warn!("ignoring persisted role: {err}");
            RoleId::Guest
        }),
    };

    if role.is_guest() {
        return Session::guest();
    }

    let persisted = storage
        .get(keys::USER)
        .and_then(|raw| serde_json::from_str::<UserProfile>(&raw).ok())
        .filter(|user| user.role() == role);

    Session::for_user(persisted.unwrap_or_else(|| directory.resolve(role)))
}
