use std::str::FromStr;

use brandhive_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions recorded by the backend for permission-changing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role's attributes are updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a role's permission set is updated.
    RolePermissionsUpdated,
    /// Emitted when a per-user override is created.
    OverrideCreated,
    /// Emitted when a per-user override is updated.
    OverrideUpdated,
    /// Emitted when a per-user override is deleted.
    OverrideDeleted,
    /// Emitted when a batch of overrides is saved at once.
    BulkOverrides,
}

impl AuditAction {
    /// Returns the stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleAssigned => "role_assigned",
            Self::RoleCreated => "role_created",
            Self::RoleUpdated => "role_updated",
            Self::RoleDeleted => "role_deleted",
            Self::RolePermissionsUpdated => "role_permissions_updated",
            Self::OverrideCreated => "override_created",
            Self::OverrideUpdated => "override_updated",
            Self::OverrideDeleted => "override_deleted",
            Self::BulkOverrides => "bulk_overrides",
        }
    }

    /// Returns all known audit actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::RoleAssigned,
            AuditAction::RoleCreated,
            AuditAction::RoleUpdated,
            AuditAction::RoleDeleted,
            AuditAction::RolePermissionsUpdated,
            AuditAction::OverrideCreated,
            AuditAction::OverrideUpdated,
            AuditAction::OverrideDeleted,
            AuditAction::BulkOverrides,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit action '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::AuditAction;

    #[test]
    fn action_roundtrip_storage_value() {
        for action in AuditAction::all() {
            let restored = AuditAction::from_str(action.as_str());
            assert!(restored.is_ok(), "{}", action.as_str());
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(AuditAction::from_str("override_toggled").is_err());
    }

    #[test]
    fn enumeration_is_complete() {
        assert_eq!(AuditAction::all().len(), 9);
    }
}
