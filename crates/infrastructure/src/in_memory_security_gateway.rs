use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use brandhive_application::{
    AuditLogEntry, AuditLogGateway, AuditLogQuery, AuthorizationGateway, CreateOverrideInput,
    OverrideSetting, RoleData, SecurityAdminGateway, UpdateOverrideInput,
};
use brandhive_core::{AppError, AppResult, UserId};
use brandhive_domain::{
    AuditAction, EffectivePermissions, PermissionOverride, Role, role_permissions,
};
use chrono::Utc;
use tokio::sync::Mutex;

/// A registered user with an assigned role.
#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    role: Role,
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: HashMap<UserId, UserRecord>,
    overrides: Vec<PermissionOverride>,
    roles: Vec<RoleData>,
    audit: Vec<AuditLogEntry>,
    next_override_id: i64,
    next_audit_id: i64,
}

/// Self-contained backend implementing all three gateway ports in memory.
///
/// Seeds the seven canonical roles on construction and appends one audit
/// entry per mutation. Intended for local development and integration tests
/// that need the full stack without a running backend.
pub struct InMemorySecurityGateway {
    actor_email: String,
    state: Mutex<InMemoryState>,
}

impl Default for InMemorySecurityGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySecurityGateway {
    /// Creates a gateway seeded with the canonical role records.
    #[must_use]
    pub fn new() -> Self {
        let roles = Role::all()
            .iter()
            .enumerate()
            .map(|(index, role)| RoleData {
                role_id: i64::try_from(index).unwrap_or(i64::MAX) + 1,
                name: role.as_str().to_owned(),
                display_name: role.display_name().to_owned(),
                hierarchy_level: role.hierarchy_level(),
                is_system: true,
                permissions: seeded_permission_map(*role),
            })
            .collect();

        Self {
            actor_email: "admin@brandhive.test".to_owned(),
            state: Mutex::new(InMemoryState {
                roles,
                ..InMemoryState::default()
            }),
        }
    }

    /// Sets the actor recorded in audit entries for subsequent mutations.
    #[must_use]
    pub fn with_actor(mut self, actor_email: impl Into<String>) -> Self {
        self.actor_email = actor_email.into();
        self
    }

    /// Registers a user with a role, recording a `role_assigned` audit entry.
    pub async fn assign_role(&self, user_id: UserId, email: impl Into<String>, role: Role) {
        let email = email.into();
        let mut state = self.state.lock().await;
        state.users.insert(
            user_id,
            UserRecord {
                email: email.clone(),
                role,
            },
        );

        let details = BTreeMap::from([("role".to_owned(), role.as_str().to_owned())]);
        push_audit(
            &mut state,
            &self.actor_email,
            Some(email),
            AuditAction::RoleAssigned,
            details,
        );
    }

    fn target_email(state: &InMemoryState, user_id: UserId) -> Option<String> {
        state.users.get(&user_id).map(|user| user.email.clone())
    }
}

/// Groups a role's permission set by resource key for the role record shape.
fn seeded_permission_map(role: Role) -> BTreeMap<String, Vec<String>> {
    if role.is_super_admin() {
        return BTreeMap::from([("*".to_owned(), vec!["*".to_owned()])]);
    }

    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for permission in role_permissions(role) {
        if let Some((resource, action)) = permission.as_str().split_once(':') {
            map.entry(resource.to_owned())
                .or_default()
                .push(action.to_owned());
        }
    }
    map
}

fn push_audit(
    state: &mut InMemoryState,
    actor_email: &str,
    target_user_email: Option<String>,
    action: AuditAction,
    details: BTreeMap<String, String>,
) {
    state.next_audit_id += 1;
    let entry = AuditLogEntry {
        id: state.next_audit_id,
        actor_email: actor_email.to_owned(),
        target_user_email,
        action: action.as_str().to_owned(),
        details,
        created_at: Utc::now().to_rfc3339(),
    };
    state.audit.push(entry);
}

fn upsert_row(
    state: &mut InMemoryState,
    user_id: UserId,
    resource: &str,
    action: brandhive_domain::OverrideAction,
    is_allowed: bool,
) -> PermissionOverride {
    if let Some(row) = state
        .overrides
        .iter_mut()
        .find(|row| row.user_id == user_id && row.resource == resource)
    {
        row.action = action;
        row.is_allowed = is_allowed;
        return row.clone();
    }

    state.next_override_id += 1;
    let row = PermissionOverride {
        id: state.next_override_id,
        user_id,
        resource: resource.to_owned(),
        action,
        is_allowed,
    };
    state.overrides.push(row.clone());
    row
}

#[async_trait]
impl AuthorizationGateway for InMemorySecurityGateway {
    async fn get_user_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let state = self.state.lock().await;
        let user = state
            .users
            .get(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        Ok(EffectivePermissions::for_role(user.role))
    }

    async fn list_user_overrides(&self, user_id: UserId) -> AppResult<Vec<PermissionOverride>> {
        let state = self.state.lock().await;

        Ok(state
            .overrides
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SecurityAdminGateway for InMemorySecurityGateway {
    async fn create_override(&self, input: CreateOverrideInput) -> AppResult<PermissionOverride> {
        let mut state = self.state.lock().await;

        if state
            .overrides
            .iter()
            .any(|row| row.user_id == input.user_id && row.resource == input.resource)
        {
            return Err(AppError::Conflict(format!(
                "override for resource '{}' already exists",
                input.resource
            )));
        }

        state.next_override_id += 1;
        let row = PermissionOverride {
            id: state.next_override_id,
            user_id: input.user_id,
            resource: input.resource,
            action: input.action,
            is_allowed: input.is_allowed,
        };
        state.overrides.push(row.clone());

        let target = Self::target_email(&state, row.user_id);
        let details = BTreeMap::from([
            ("resource".to_owned(), row.resource.clone()),
            ("action".to_owned(), row.action.as_str().to_owned()),
            ("is_allowed".to_owned(), row.is_allowed.to_string()),
        ]);
        push_audit(
            &mut state,
            &self.actor_email,
            target,
            AuditAction::OverrideCreated,
            details,
        );

        Ok(row)
    }

    async fn update_override(
        &self,
        override_id: i64,
        input: UpdateOverrideInput,
    ) -> AppResult<PermissionOverride> {
        let mut state = self.state.lock().await;
        let row = state
            .overrides
            .iter_mut()
            .find(|row| row.id == override_id)
            .ok_or_else(|| AppError::NotFound(format!("override {override_id}")))?;

        if let Some(action) = input.action {
            row.action = action;
        }
        if let Some(is_allowed) = input.is_allowed {
            row.is_allowed = is_allowed;
        }
        let row = row.clone();

        let target = Self::target_email(&state, row.user_id);
        let details = BTreeMap::from([
            ("resource".to_owned(), row.resource.clone()),
            ("action".to_owned(), row.action.as_str().to_owned()),
            ("is_allowed".to_owned(), row.is_allowed.to_string()),
        ]);
        push_audit(
            &mut state,
            &self.actor_email,
            target,
            AuditAction::OverrideUpdated,
            details,
        );

        Ok(row)
    }

    async fn delete_override(&self, override_id: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let position = state
            .overrides
            .iter()
            .position(|row| row.id == override_id)
            .ok_or_else(|| AppError::NotFound(format!("override {override_id}")))?;
        let row = state.overrides.remove(position);

        let target = Self::target_email(&state, row.user_id);
        let details = BTreeMap::from([("resource".to_owned(), row.resource)]);
        push_audit(
            &mut state,
            &self.actor_email,
            target,
            AuditAction::OverrideDeleted,
            details,
        );

        Ok(())
    }

    async fn save_overrides(
        &self,
        user_id: UserId,
        entries: Vec<OverrideSetting>,
    ) -> AppResult<Vec<PermissionOverride>> {
        let mut state = self.state.lock().await;

        let saved: Vec<PermissionOverride> = entries
            .iter()
            .map(|entry| {
                upsert_row(
                    &mut state,
                    user_id,
                    &entry.resource,
                    entry.action,
                    entry.is_allowed,
                )
            })
            .collect();

        let target = Self::target_email(&state, user_id);
        let details = BTreeMap::from([("count".to_owned(), saved.len().to_string())]);
        push_audit(
            &mut state,
            &self.actor_email,
            target,
            AuditAction::BulkOverrides,
            details,
        );

        Ok(saved)
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleData>> {
        Ok(self.state.lock().await.roles.clone())
    }

    async fn update_role_permissions(
        &self,
        role_id: i64,
        permissions: BTreeMap<String, Vec<String>>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.role_id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role {role_id}")))?;
        role.permissions = permissions;
        let role_name = role.name.clone();

        let details = BTreeMap::from([("role".to_owned(), role_name)]);
        push_audit(
            &mut state,
            &self.actor_email,
            None,
            AuditAction::RolePermissionsUpdated,
            details,
        );

        Ok(())
    }
}

#[async_trait]
impl AuditLogGateway for InMemorySecurityGateway {
    async fn list_audit_log(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let state = self.state.lock().await;

        let mut entries: Vec<AuditLogEntry> = state
            .audit
            .iter()
            .filter(|entry| {
                query
                    .action_filter
                    .is_none_or(|action| entry.action == action.as_str())
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| (&b.created_at, b.id).cmp(&(&a.created_at, a.id)));

        Ok(entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}
