//! # Access Control
//!
//! Roles, capabilities and the one table that maps between them.
//!
//! ## Capability Table
//! ```text
//! ┌───────────────┬────────────┬───────┬────────────┐
//! │ Capability    │ superadmin │ admin │ pharmacist │
//! ├───────────────┼────────────┼───────┼────────────┤
//! │ manage-users  │     ✓      │       │            │
//! │ manage-items  │     ✓      │       │     ✓      │
//! │ create-sale   │            │       │     ✓      │
//! │ read-sale     │     ✓      │   ✓   │     ✓      │
//! └───────────────┴────────────┴───────┴────────────┘
//! ```
//!
//! Every endpoint asks [`Subject::require`]; nothing else inspects roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{AccessError, ValidationError};

// =============================================================================
// Role
// =============================================================================

/// Role of a back-office user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Pharmacist,
}

impl Role {
    /// The capabilities granted to this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Superadmin => &[
                Capability::ManageUsers,
                Capability::ManageItems,
                Capability::ReadSale,
            ],
            Role::Admin => &[Capability::ReadSale],
            Role::Pharmacist => &[
                Capability::ManageItems,
                Capability::CreateSale,
                Capability::ReadSale,
            ],
        }
    }

    /// Whether this role holds `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Pharmacist => "pharmacist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "superadmin".to_string(),
                    "admin".to_string(),
                    "pharmacist".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Capability
// =============================================================================

/// An action class guarded by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ManageUsers,
    ManageItems,
    CreateSale,
    ReadSale,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ManageUsers => "manage-users",
            Capability::ManageItems => "manage-items",
            Capability::CreateSale => "create-sale",
            Capability::ReadSale => "read-sale",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Subject
// =============================================================================

/// An authenticated caller, as decoded from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub role: Role,
}

impl Subject {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Subject {
            id: id.into(),
            role,
        }
    }

    /// Checks the capability table for this subject's role.
    ///
    /// ## Example
    /// ```rust
    /// use pharmos_core::access::{Capability, Role, Subject};
    ///
    /// let cashier = Subject::new("u-1", Role::Pharmacist);
    /// assert!(cashier.require(Capability::CreateSale).is_ok());
    /// assert!(cashier.require(Capability::ManageUsers).is_err());
    /// ```
    pub fn require(&self, capability: Capability) -> Result<&Self, AccessError> {
        if self.role.can(capability) {
            Ok(self)
        } else {
            Err(AccessError::Forbidden)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pharmacist_creates_sales() {
        assert!(Role::Pharmacist.can(Capability::CreateSale));
        assert!(!Role::Superadmin.can(Capability::CreateSale));
        assert!(!Role::Admin.can(Capability::CreateSale));
    }

    #[test]
    fn test_item_management() {
        assert!(Role::Superadmin.can(Capability::ManageItems));
        assert!(Role::Pharmacist.can(Capability::ManageItems));
        assert!(!Role::Admin.can(Capability::ManageItems));
    }

    #[test]
    fn test_only_superadmin_manages_users() {
        assert!(Role::Superadmin.can(Capability::ManageUsers));
        assert!(!Role::Admin.can(Capability::ManageUsers));
        assert!(!Role::Pharmacist.can(Capability::ManageUsers));
    }

    #[test]
    fn test_require_returns_forbidden() {
        let admin = Subject::new("u-2", Role::Admin);
        assert_eq!(
            admin.require(Capability::ManageItems).unwrap_err(),
            AccessError::Forbidden
        );
        assert_eq!(admin.require(Capability::ReadSale).unwrap().id, "u-2");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Pharmacist".parse::<Role>().unwrap(), Role::Pharmacist);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("cashier".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"superadmin\"");
        let role: Role = serde_json::from_str("\"pharmacist\"").unwrap();
        assert_eq!(role, Role::Pharmacist);
    }
}
