use std::sync::Arc;

use async_trait::async_trait;
use brandhive_core::{AppResult, UserId};
use brandhive_domain::{
    EffectivePermissions, PermissionOverride, ResourceAccessState, find_override,
};

/// Gateway port for read-side permission lookups against the backend.
#[async_trait]
pub trait AuthorizationGateway: Send + Sync {
    /// Fetches the super-admin flag and flattened role grants for a user.
    async fn get_user_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions>;

    /// Lists the per-user override rows for a user.
    async fn list_user_overrides(&self, user_id: UserId)
    -> AppResult<Vec<PermissionOverride>>;
}

/// Resolution context for one user, passed explicitly instead of read from
/// ambient state.
///
/// A context built before overrides have been fetched resolves every resource
/// as inherited with role-only evaluation; it never reports a denial it has
/// not seen. Callers use [`AccessContext::overrides_loaded`] to distinguish
/// "still loading" from "denied".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    permissions: EffectivePermissions,
    overrides: Option<Vec<PermissionOverride>>,
}

impl AccessContext {
    /// Creates a role-only context; overrides are treated as not yet loaded.
    #[must_use]
    pub fn new(permissions: EffectivePermissions) -> Self {
        Self {
            permissions,
            overrides: None,
        }
    }

    /// Creates a fully loaded context.
    #[must_use]
    pub fn with_overrides(
        permissions: EffectivePermissions,
        overrides: Vec<PermissionOverride>,
    ) -> Self {
        Self {
            permissions,
            overrides: Some(overrides),
        }
    }

    /// Returns whether override rows have been loaded into this context.
    #[must_use]
    pub fn overrides_loaded(&self) -> bool {
        self.overrides.is_some()
    }

    /// Returns the flattened permission view this context was built from.
    #[must_use]
    pub fn permissions(&self) -> &EffectivePermissions {
        &self.permissions
    }

    /// Returns the override state for a resource.
    #[must_use]
    pub fn resource_state(&self, resource: &str) -> ResourceAccessState {
        match &self.overrides {
            None => ResourceAccessState::Inherited,
            Some(rows) => ResourceAccessState::classify(find_override(rows, resource)),
        }
    }

    /// Resolves effective access for a resource.
    ///
    /// Super admins bypass override evaluation entirely. A denial always wins
    /// over a granting role default.
    #[must_use]
    pub fn can_access(&self, resource: &str) -> bool {
        if self.permissions.is_super_admin {
            return true;
        }

        match self.resource_state(resource) {
            ResourceAccessState::Granted => true,
            ResourceAccessState::Denied => false,
            ResourceAccessState::Inherited => self.permissions.grants_resource(resource),
        }
    }
}

/// Application service resolving effective access from backend data.
#[derive(Clone)]
pub struct AuthorizationService {
    gateway: Arc<dyn AuthorizationGateway>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a gateway implementation.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthorizationGateway>) -> Self {
        Self { gateway }
    }

    /// Fetches permissions and overrides and builds a full resolution context.
    pub async fn access_context(&self, user_id: UserId) -> AppResult<AccessContext> {
        let permissions = self.gateway.get_user_permissions(user_id).await?;
        let overrides = self.gateway.list_user_overrides(user_id).await?;

        Ok(AccessContext::with_overrides(permissions, overrides))
    }

    /// Builds a role-only context without fetching overrides.
    pub async fn role_only_context(&self, user_id: UserId) -> AppResult<AccessContext> {
        let permissions = self.gateway.get_user_permissions(user_id).await?;

        Ok(AccessContext::new(permissions))
    }

    /// Fetches and resolves effective access for one resource.
    pub async fn can_access(&self, user_id: UserId, resource: &str) -> AppResult<bool> {
        let context = self.access_context(user_id).await?;

        Ok(context.can_access(resource))
    }
}
