//! `storefront-client`
//!
//! **Responsibility:** client-side session lifecycle for the storefront.
//!
//! This crate provides:
//! - the session store (durable, injectable, observable)
//! - the authenticated API client (bearer token in, 401/403 handling out)
//! - the auth completion handshake
//! - error-to-notice normalization
//!
//! Access decisions themselves live in `storefront-auth`.

pub mod auth_flow;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod navigation;
pub mod notify;
pub mod storage;
pub mod store;

pub use auth_flow::{AuthCompletion, AuthFlowError, AuthOutcome, AuthStage, ProfileFetcher};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use interceptor::ApiClient;
pub use navigation::{HistoryNavigator, Navigator};
pub use notify::{Notice, NoticeKind, NoticeLog, Notifier, report_error};
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{PlaceholderDirectory, SessionStore, UserDirectory};
