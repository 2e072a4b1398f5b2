//! `storefront-auth` — pure session and access-control model.
//!
//! Roles, the role-landing table, the session value and the navigation
//! guards. This crate is intentionally decoupled from HTTP and storage.

pub mod guards;
pub mod landing;
pub mod roles;
pub mod session;
pub mod user;

pub use guards::{AuthenticationGate, DenialKind, GuardDecision, Redirect, RoleGate, check_route};
pub use roles::{RoleId, RoleParseError};
pub use session::Session;
pub use user::{ProfileError, UserProfile};
