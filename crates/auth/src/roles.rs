use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission class of the acting user.
///
/// The set is closed: every role the platform knows about is listed here and
/// every table keyed by role matches on it exhaustively.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleId {
    SuperAdmin,
    Admin,
    Manager,
    StaffPos,
    StaffWarehouse,
    StaffSupport,
    Customer,
    #[default]
    Guest,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role code '{0}'")]
pub struct RoleParseError(pub String);

impl RoleId {
    pub const ALL: [RoleId; 8] = [
        RoleId::SuperAdmin,
        RoleId::Admin,
        RoleId::Manager,
        RoleId::StaffPos,
        RoleId::StaffWarehouse,
        RoleId::StaffSupport,
        RoleId::Customer,
        RoleId::Guest,
    ];

    /// Roles that land on the administrative dashboard after signing in.
    pub const PRIVILEGED: [RoleId; 6] = [
        RoleId::SuperAdmin,
        RoleId::Admin,
        RoleId::Manager,
        RoleId::StaffPos,
        RoleId::StaffWarehouse,
        RoleId::StaffSupport,
    ];

    /// Wire code, as sent by the API in `role_code`.
    pub fn code(&self) -> &'static str {
        match self {
            RoleId::SuperAdmin => "SUPER_ADMIN",
            RoleId::Admin => "ADMIN",
            RoleId::Manager => "MANAGER",
            RoleId::StaffPos => "STAFF_POS",
            RoleId::StaffWarehouse => "STAFF_WAREHOUSE",
            RoleId::StaffSupport => "STAFF_SUPPORT",
            RoleId::Customer => "CUSTOMER",
            RoleId::Guest => "GUEST",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            RoleId::SuperAdmin => "Super Administrator",
            RoleId::Admin => "Administrator",
            RoleId::Manager => "Store Manager",
            RoleId::StaffPos => "Point-of-Sale Staff",
            RoleId::StaffWarehouse => "Warehouse Staff",
            RoleId::StaffSupport => "Support Staff",
            RoleId::Customer => "Customer",
            RoleId::Guest => "Guest",
        }
    }

    pub fn is_guest(&self) -> bool {
        *self == RoleId::Guest
    }

    /// Administrative and operational roles (everything except customer and guest).
    pub fn is_privileged(&self) -> bool {
        match self {
            RoleId::SuperAdmin
            | RoleId::Admin
            | RoleId::Manager
            | RoleId::StaffPos
            | RoleId::StaffWarehouse
            | RoleId::StaffSupport => true,
            RoleId::Customer | RoleId::Guest => false,
        }
    }
}

impl core::fmt::Display for RoleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RoleId {
    type Err = RoleParseError;

    /// Accepts wire codes case-insensitively; `-` is treated like `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        RoleId::ALL
            .into_iter()
            .find(|role| role.code() == normalized)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}
