//! User-facing notices raised from API errors.
//!
//! This is not a guard: it never redirects and never touches the session.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Persistent; stays until dismissed.
    AccessDenied,
    /// Transient toast.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_persistent(&self) -> bool {
        self.kind == NoticeKind::AccessDenied
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Normalize an API error into a notice and hand it to `notifier`.
///
/// `403` becomes a persistent access-denied notice; every other error a
/// transient failure carrying the best available message.
pub fn report_error(err: &ApiError, notifier: &dyn Notifier) -> Notice {
    let notice = match err {
        ApiError::Forbidden { message } => Notice {
            kind: NoticeKind::AccessDenied,
            message: if message.is_empty() || message == "Forbidden" {
                "You do not have permission to perform this action.".to_string()
            } else {
                message.clone()
            },
            raised_at: Utc::now(),
        },
        other => Notice {
            kind: NoticeKind::Failure,
            message: other.user_message(),
            raised_at: Utc::now(),
        },
    };

    notifier.notify(notice.clone());
    notice
}

/// Notifier that keeps notices in memory.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Drop transient notices, keeping persistent ones.
    pub fn expire_transient(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.retain(Notice::is_persistent);
        }
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::AccessDenied => tracing::warn!(message = %notice.message, "access denied"),
            NoticeKind::Failure => tracing::info!(message = %notice.message, "request failed"),
        }
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
