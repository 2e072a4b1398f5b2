//! Server-issued user profile.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RoleId;

/// Profile of the signed-in user as returned by the "current user" endpoint.
///
/// Only `role_code` is load-bearing for access control; the other fields are
/// carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(alias = "roleCode")]
    pub role_code: RoleId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile payload is not a JSON object")]
    NotAnObject,

    #[error("profile has no role_code field")]
    MissingRole,

    #[error("profile role_code is not a known role: {0}")]
    UnknownRole(String),

    #[error("profile resolves to the guest role")]
    GuestRole,

    #[error("profile is malformed: {0}")]
    Malformed(String),
}

impl UserProfile {
    pub fn role(&self) -> RoleId {
        self.role_code
    }

    /// Like [`from_json`](Self::from_json), but also rejects guest profiles:
    /// a signed-in user must carry a non-guest role.
    pub fn signed_in_from_json(value: &serde_json::Value) -> Result<Self, ProfileError> {
        let profile = Self::from_json(value)?;
        if profile.role().is_guest() {
            return Err(ProfileError::GuestRole);
        }
        Ok(profile)
    }

    /// Resolve a profile from a raw JSON payload.
    ///
    /// Accepts the profile either at the top level or wrapped in `data` / `user`.
    /// `id` may be a string or a number and defaults to empty.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ProfileError> {
        let obj = value.as_object().ok_or(ProfileError::NotAnObject)?;

        let obj = ["data", "user"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(|v| v.as_object()))
            .unwrap_or(obj);

        let raw_role = obj
            .get("role_code")
            .or_else(|| obj.get("roleCode"))
            .and_then(|v| v.as_str())
            .ok_or(ProfileError::MissingRole)?;

        let role_code: RoleId = raw_role
            .parse()
            .map_err(|_| ProfileError::UnknownRole(raw_role.to_string()))?;

        let id = match obj.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => return Err(ProfileError::Malformed(format!("unexpected id: {other}"))),
        };

        let text = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(str::to_string);

        Ok(Self {
            id,
            email: text("email"),
            full_name: text("full_name").or_else(|| text("name")),
            role_code,
        })
    }
}
