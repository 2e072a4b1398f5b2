use serde::Serialize;

use crate::{RoleId, UserProfile};

/// Who is acting, and under which role.
///
/// # Invariants
/// - `is_authenticated() == (current_role() != Guest)`
/// - `current_user().is_none() == (current_role() == Guest)`
///
/// Fields are private so the invariants can only be established through the
/// constructors below.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Session {
    current_role: RoleId,
    current_user: Option<UserProfile>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    /// Session for a resolved user; a guest-role profile yields a guest session.
    pub fn for_user(user: UserProfile) -> Self {
        if user.role().is_guest() {
            return Self::guest();
        }
        Self {
            current_role: user.role(),
            current_user: Some(user),
        }
    }

    pub fn current_role(&self) -> RoleId {
        self.current_role
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.current_role.is_guest()
    }
}
