//! Navigation sink used by the interceptor and the auth completion flow.

use std::sync::Mutex;

use storefront_auth::Redirect;

/// Performs client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, redirect: Redirect);
}

/// Navigator that records every redirect in order.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Redirect>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Redirect> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Most recent navigation target, if any.
    pub fn location(&self) -> Option<String> {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().map(|r| r.to.clone()))
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, redirect: Redirect) {
        tracing::debug!(to = %redirect.to, "navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push(redirect);
        }
    }
}
