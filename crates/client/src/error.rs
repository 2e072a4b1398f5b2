//! API error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the session is gone; the interceptor already cleared it.
    #[error("unauthenticated")]
    Unauthenticated,

    /// 403: authenticated but not allowed. The session is left intact.
    #[error("access denied: {message}")]
    Forbidden { message: String },

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthenticated => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Parse(_) => None,
        }
    }

    /// Best message available for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Forbidden { message } | ApiError::Status { message, .. } => message.clone(),
            ApiError::Network(_) => "Unable to reach the server.".to_string(),
            ApiError::Parse(_) => "The server returned an unexpected response.".to_string(),
        }
    }
}

/// Pull the most useful human message out of an error payload.
///
/// Looks at `message`, `error`, `detail`, then the first entry of `errors`;
/// falls back to the raw body when it is short plain text.
pub fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return (trimmed.len() <= 200 && !trimmed.starts_with('<')).then(|| trimmed.to_string());
    };

    let text = |v: &serde_json::Value| v.as_str().map(str::to_string).filter(|s| !s.is_empty());

    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(text))
        .or_else(|| {
            let first = value.get("errors")?.as_array()?.first()?;
            text(first).or_else(|| first.get("message").and_then(text))
        })
}
