use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use brandhive_core::{AppError, AppResult, UserId};
use brandhive_domain::{
    AuditAction, OverrideAction, OverrideTransition, PermissionOverride, Resource,
    ResourceAccessState, find_override,
};

use crate::AuthorizationGateway;

/// Wildcard key granting all actions on all resources.
const WILDCARD_RESOURCE: &str = "*";

/// Input payload for creating an override row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOverrideInput {
    /// User the override applies to.
    pub user_id: UserId,
    /// Module key the override applies to.
    pub resource: String,
    /// Granted or revoked action.
    pub action: OverrideAction,
    /// Marks the override as a grant.
    pub is_allowed: bool,
}

/// Partial update payload for an existing override row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOverrideInput {
    /// Replacement action, when present.
    pub action: Option<OverrideAction>,
    /// Replacement grant flag, when present.
    pub is_allowed: Option<bool>,
}

/// One entry of a bulk override save for the permission matrix screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSetting {
    /// Module key the entry applies to.
    pub resource: String,
    /// Granted or revoked action.
    pub action: OverrideAction,
    /// Marks the entry as a grant.
    pub is_allowed: bool,
}

/// Backend-owned role record, editable through role management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleData {
    /// Stable role identifier.
    pub role_id: i64,
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Authority level used for meets-or-exceeds checks.
    pub hierarchy_level: u8,
    /// Marks a built-in role that cannot be deleted.
    pub is_system: bool,
    /// Resource key to ordered action list, or `"*" -> ["*"]` for the wildcard role.
    pub permissions: BTreeMap<String, Vec<String>>,
}

impl RoleData {
    /// Returns whether this role holds the wildcard grant.
    #[must_use]
    pub fn holds_wildcard(&self) -> bool {
        self.permissions.contains_key(WILDCARD_RESOURCE)
    }
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable entry identifier.
    pub id: i64,
    /// Email of the user who performed the change.
    pub actor_email: String,
    /// Email of the affected user, when one exists.
    pub target_user_email: Option<String>,
    /// Stable action identifier.
    pub action: String,
    /// Free-form key/value context describing the change.
    pub details: BTreeMap<String, String>,
    /// Entry timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
///
/// Results are ordered newest-first by `created_at`; the ordering is part of
/// the backend contract, not applied client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional exact-match action filter.
    pub action_filter: Option<AuditAction>,
}

impl AuditLogQuery {
    /// Creates a query with the default page size and no filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: 50,
            offset: 0,
            action_filter: None,
        }
    }
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one toggle step through the override cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideCycleOutcome {
    /// State before the toggle.
    pub previous: ResourceAccessState,
    /// State re-read from the backend after the toggle.
    pub current: ResourceAccessState,
}

/// Gateway port for override and role administration against the backend.
///
/// The backend is the sole authority for committing these mutations and for
/// writing the matching audit entries.
#[async_trait]
pub trait SecurityAdminGateway: Send + Sync {
    /// Creates an override row.
    async fn create_override(&self, input: CreateOverrideInput) -> AppResult<PermissionOverride>;

    /// Updates fields of an existing override row.
    async fn update_override(
        &self,
        override_id: i64,
        input: UpdateOverrideInput,
    ) -> AppResult<PermissionOverride>;

    /// Deletes an override row, reverting the user to the role default.
    async fn delete_override(&self, override_id: i64) -> AppResult<()>;

    /// Upserts a batch of override rows for one user in one backend call.
    ///
    /// The backend records the batch as a single bulk audit event.
    async fn save_overrides(
        &self,
        user_id: UserId,
        entries: Vec<OverrideSetting>,
    ) -> AppResult<Vec<PermissionOverride>>;

    /// Lists all role records.
    async fn list_roles(&self) -> AppResult<Vec<RoleData>>;

    /// Replaces a role's permission map.
    async fn update_role_permissions(
        &self,
        role_id: i64,
        permissions: BTreeMap<String, Vec<String>>,
    ) -> AppResult<()>;
}

/// Gateway port for reading the append-only audit log.
#[async_trait]
pub trait AuditLogGateway: Send + Sync {
    /// Lists audit entries, newest first.
    async fn list_audit_log(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}

/// Application service for permission administration workflows.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_gateway: Arc<dyn AuthorizationGateway>,
    admin_gateway: Arc<dyn SecurityAdminGateway>,
    audit_log_gateway: Arc<dyn AuditLogGateway>,
}

impl SecurityAdminService {
    /// Creates a new service from required gateways.
    #[must_use]
    pub fn new(
        authorization_gateway: Arc<dyn AuthorizationGateway>,
        admin_gateway: Arc<dyn SecurityAdminGateway>,
        audit_log_gateway: Arc<dyn AuditLogGateway>,
    ) -> Self {
        Self {
            authorization_gateway,
            admin_gateway,
            audit_log_gateway,
        }
    }

    /// Advances the override cycle one step for a `(user, resource)` pair.
    ///
    /// Applies the single legal transition out of the current state, then
    /// re-reads the rows so the backend's committed state is reported rather
    /// than an optimistic local merge.
    pub async fn toggle_override(
        &self,
        user_id: UserId,
        resource: &str,
    ) -> AppResult<OverrideCycleOutcome> {
        let rows = self
            .authorization_gateway
            .list_user_overrides(user_id)
            .await?;
        let existing = find_override(&rows, resource);
        let previous = ResourceAccessState::classify(existing);
        let existing_id = existing.map(|row| row.id);

        match OverrideTransition::from_state(previous) {
            OverrideTransition::Grant => {
                self.admin_gateway
                    .create_override(CreateOverrideInput {
                        user_id,
                        resource: resource.to_owned(),
                        action: OverrideAction::Write,
                        is_allowed: true,
                    })
                    .await?;
            }
            OverrideTransition::Deny => {
                let override_id = existing_id.ok_or_else(|| {
                    AppError::Internal(format!(
                        "granted state without an override row for resource '{resource}'"
                    ))
                })?;
                self.admin_gateway
                    .update_override(
                        override_id,
                        UpdateOverrideInput {
                            action: Some(OverrideAction::None),
                            is_allowed: Some(false),
                        },
                    )
                    .await?;
            }
            OverrideTransition::Clear => {
                let override_id = existing_id.ok_or_else(|| {
                    AppError::Internal(format!(
                        "denied state without an override row for resource '{resource}'"
                    ))
                })?;
                self.admin_gateway.delete_override(override_id).await?;
            }
        }

        let rows = self
            .authorization_gateway
            .list_user_overrides(user_id)
            .await?;
        let current = ResourceAccessState::classify(find_override(&rows, resource));

        Ok(OverrideCycleOutcome { previous, current })
    }

    /// Creates or updates an override row outside the guided cycle.
    ///
    /// Any `(action, is_allowed)` combination is accepted; classification of
    /// the resulting state is the resolver's job.
    pub async fn set_override(
        &self,
        user_id: UserId,
        resource: &str,
        action: OverrideAction,
        is_allowed: bool,
    ) -> AppResult<PermissionOverride> {
        let rows = self
            .authorization_gateway
            .list_user_overrides(user_id)
            .await?;

        match find_override(&rows, resource) {
            Some(existing) => {
                self.admin_gateway
                    .update_override(
                        existing.id,
                        UpdateOverrideInput {
                            action: Some(action),
                            is_allowed: Some(is_allowed),
                        },
                    )
                    .await
            }
            None => {
                self.admin_gateway
                    .create_override(CreateOverrideInput {
                        user_id,
                        resource: resource.to_owned(),
                        action,
                        is_allowed,
                    })
                    .await
            }
        }
    }

    /// Deletes the override row for a resource, if one exists.
    ///
    /// Returns whether a row was removed.
    pub async fn clear_override(&self, user_id: UserId, resource: &str) -> AppResult<bool> {
        let rows = self
            .authorization_gateway
            .list_user_overrides(user_id)
            .await?;

        match find_override(&rows, resource) {
            Some(existing) => {
                self.admin_gateway.delete_override(existing.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Saves a batch of override settings for one user.
    ///
    /// The batch goes to the backend as one call so it lands as a single bulk
    /// audit event. Returns the number of rows the backend reported back.
    pub async fn save_override_matrix(
        &self,
        user_id: UserId,
        entries: Vec<OverrideSetting>,
    ) -> AppResult<usize> {
        let rows = self.admin_gateway.save_overrides(user_id, entries).await?;

        Ok(rows.len())
    }

    /// Lists all role records.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleData>> {
        self.admin_gateway.list_roles().await
    }

    /// Replaces a role's permission map after validating its shape.
    ///
    /// Keys must be known resource keys or the wildcard, and at most one role
    /// may hold the wildcard at a time.
    pub async fn update_role_permissions(
        &self,
        role_id: i64,
        permissions: BTreeMap<String, Vec<String>>,
    ) -> AppResult<()> {
        for key in permissions.keys() {
            if key != WILDCARD_RESOURCE && Resource::parse(key).is_none() {
                return Err(AppError::Validation(format!(
                    "unknown resource key '{key}' in role permissions"
                )));
            }
        }

        if permissions.contains_key(WILDCARD_RESOURCE) {
            let roles = self.admin_gateway.list_roles().await?;
            if let Some(holder) = roles
                .iter()
                .find(|role| role.holds_wildcard() && role.role_id != role_id)
            {
                return Err(AppError::Validation(format!(
                    "role '{}' already holds the wildcard grant",
                    holder.name
                )));
            }
        }

        self.admin_gateway
            .update_role_permissions(role_id, permissions)
            .await
    }

    /// Lists recent audit entries, newest first.
    pub async fn list_audit_log(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        self.audit_log_gateway.list_audit_log(query).await
    }
}
