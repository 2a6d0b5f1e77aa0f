use std::collections::BTreeSet;
use std::str::FromStr;

use brandhive_core::AppError;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Module key subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Agency profile and settings.
    Agency,
    /// Brand workspaces.
    Brand,
    /// Creator roster.
    Creators,
    /// Content and design generation.
    Content,
    /// Campaign planning.
    Campaigns,
    /// Client relationship management.
    Crm,
    /// Analytics dashboards.
    Analytics,
    /// Team membership.
    Team,
    /// Role management screens.
    Roles,
    /// Audit log screens.
    Audit,
}

impl Resource {
    /// Returns the stable storage key for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agency => "agency",
            Self::Brand => "brand",
            Self::Creators => "creators",
            Self::Content => "content",
            Self::Campaigns => "campaigns",
            Self::Crm => "crm",
            Self::Analytics => "analytics",
            Self::Team => "team",
            Self::Roles => "roles",
            Self::Audit => "audit",
        }
    }

    /// Resolves a stored resource key, returning `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "agency" => Some(Self::Agency),
            "brand" => Some(Self::Brand),
            "creators" => Some(Self::Creators),
            "content" => Some(Self::Content),
            "campaigns" => Some(Self::Campaigns),
            "crm" => Some(Self::Crm),
            "analytics" => Some(Self::Analytics),
            "team" => Some(Self::Team),
            "roles" => Some(Self::Roles),
            "audit" => Some(Self::Audit),
            _ => None,
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Agency,
            Resource::Brand,
            Resource::Creators,
            Resource::Content,
            Resource::Campaigns,
            Resource::Crm,
            Resource::Analytics,
            Resource::Team,
            Resource::Roles,
            Resource::Audit,
        ];

        ALL
    }
}

/// Permission enforced by the dashboard's visibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows viewing content items.
    ContentView,
    /// Allows creating content items.
    ContentCreate,
    /// Allows editing and deleting content items.
    ContentManage,
    /// Allows viewing brand workspaces.
    BrandView,
    /// Allows managing brand workspaces.
    BrandManage,
    /// Allows viewing campaigns.
    CampaignsView,
    /// Allows managing campaigns.
    CampaignsManage,
    /// Allows viewing analytics dashboards.
    AnalyticsView,
    /// Allows viewing CRM records.
    CrmView,
    /// Allows managing CRM records.
    CrmManage,
    /// Allows viewing the creator roster.
    CreatorsView,
    /// Allows managing the creator roster.
    CreatorsManage,
    /// Allows viewing agency settings.
    AgencyView,
    /// Allows managing agency settings.
    AgencyManage,
    /// Allows viewing team membership.
    TeamView,
    /// Allows managing team membership.
    TeamManage,
    /// Allows managing roles and overrides.
    RolesManage,
    /// Allows reading the audit log.
    AuditView,
}

impl Permission {
    /// Returns the stable `resource:action` value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentView => "content:view",
            Self::ContentCreate => "content:create",
            Self::ContentManage => "content:manage",
            Self::BrandView => "brand:view",
            Self::BrandManage => "brand:manage",
            Self::CampaignsView => "campaigns:view",
            Self::CampaignsManage => "campaigns:manage",
            Self::AnalyticsView => "analytics:view",
            Self::CrmView => "crm:view",
            Self::CrmManage => "crm:manage",
            Self::CreatorsView => "creators:view",
            Self::CreatorsManage => "creators:manage",
            Self::AgencyView => "agency:view",
            Self::AgencyManage => "agency:manage",
            Self::TeamView => "team:view",
            Self::TeamManage => "team:manage",
            Self::RolesManage => "roles:manage",
            Self::AuditView => "audit:view",
        }
    }

    /// Returns the resource this permission applies to.
    #[must_use]
    pub fn resource(&self) -> Resource {
        match self {
            Self::ContentView | Self::ContentCreate | Self::ContentManage => Resource::Content,
            Self::BrandView | Self::BrandManage => Resource::Brand,
            Self::CampaignsView | Self::CampaignsManage => Resource::Campaigns,
            Self::AnalyticsView => Resource::Analytics,
            Self::CrmView | Self::CrmManage => Resource::Crm,
            Self::CreatorsView | Self::CreatorsManage => Resource::Creators,
            Self::AgencyView | Self::AgencyManage => Resource::Agency,
            Self::TeamView | Self::TeamManage => Resource::Team,
            Self::RolesManage => Resource::Roles,
            Self::AuditView => Resource::Audit,
        }
    }

    /// Resolves a stored permission value, returning `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::ContentView,
            Permission::ContentCreate,
            Permission::ContentManage,
            Permission::BrandView,
            Permission::BrandManage,
            Permission::CampaignsView,
            Permission::CampaignsManage,
            Permission::AnalyticsView,
            Permission::CrmView,
            Permission::CrmManage,
            Permission::CreatorsView,
            Permission::CreatorsManage,
            Permission::AgencyView,
            Permission::AgencyManage,
            Permission::TeamView,
            Permission::TeamManage,
            Permission::RolesManage,
            Permission::AuditView,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

const VIEWER_PERMISSIONS: &[Permission] = &[Permission::ContentView];

const CREATOR_PERMISSIONS: &[Permission] =
    &[Permission::ContentView, Permission::ContentCreate];

const BRAND_MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::ContentView,
    Permission::ContentCreate,
    Permission::BrandView,
    Permission::CampaignsView,
    Permission::AnalyticsView,
];

const BRAND_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ContentView,
    Permission::ContentCreate,
    Permission::ContentManage,
    Permission::BrandView,
    Permission::BrandManage,
    Permission::CampaignsView,
    Permission::CampaignsManage,
    Permission::AnalyticsView,
    Permission::CrmView,
    Permission::CreatorsView,
    Permission::TeamView,
];

const AGENCY_MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::ContentView,
    Permission::ContentCreate,
    Permission::ContentManage,
    Permission::BrandView,
    Permission::BrandManage,
    Permission::CampaignsView,
    Permission::CampaignsManage,
    Permission::AnalyticsView,
    Permission::CrmView,
    Permission::CrmManage,
    Permission::CreatorsView,
    Permission::CreatorsManage,
    Permission::AgencyView,
    Permission::TeamView,
];

const AGENCY_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ContentView,
    Permission::ContentCreate,
    Permission::ContentManage,
    Permission::BrandView,
    Permission::BrandManage,
    Permission::CampaignsView,
    Permission::CampaignsManage,
    Permission::AnalyticsView,
    Permission::CrmView,
    Permission::CrmManage,
    Permission::CreatorsView,
    Permission::CreatorsManage,
    Permission::AgencyView,
    Permission::AgencyManage,
    Permission::TeamView,
    Permission::TeamManage,
];

/// Returns the default grants for a role.
///
/// Sets are strictly nested going up the hierarchy. `SuperAdmin` is the
/// wildcard role and expands to every known permission.
#[must_use]
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Viewer => VIEWER_PERMISSIONS,
        Role::Creator => CREATOR_PERMISSIONS,
        Role::BrandMember => BRAND_MEMBER_PERMISSIONS,
        Role::BrandAdmin => BRAND_ADMIN_PERMISSIONS,
        Role::AgencyMember => AGENCY_MEMBER_PERMISSIONS,
        Role::AgencyAdmin => AGENCY_ADMIN_PERMISSIONS,
        Role::SuperAdmin => Permission::all(),
    }
}

/// Flattened permission view for one user, derived and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions {
    /// Marks a user who bypasses all permission checks.
    pub is_super_admin: bool,
    /// Flattened `resource:action` grants from the user's role.
    pub permissions: BTreeSet<String>,
}

impl EffectivePermissions {
    /// Builds the effective view from a role's default grants.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            is_super_admin: role.is_super_admin(),
            permissions: role_permissions(role)
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }

    /// Returns whether the permission string is granted.
    #[must_use]
    pub fn has(&self, permission: &str) -> bool {
        self.is_super_admin || self.permissions.contains(permission)
    }

    /// Returns whether any action on the resource is granted.
    #[must_use]
    pub fn grants_resource(&self, resource: &str) -> bool {
        if self.is_super_admin {
            return true;
        }

        let prefix = format!("{resource}:");
        self.permissions
            .iter()
            .any(|permission| permission.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use crate::role::Role;

    use super::{EffectivePermissions, Permission, Resource, role_permissions};

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert!(restored.is_ok(), "{}", permission.as_str());
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("content:unknown").is_err());
        assert!(Permission::parse("brandish:view").is_none());
    }

    #[test]
    fn permission_value_matches_resource_key() {
        for permission in Permission::all() {
            let prefix = format!("{}:", permission.resource().as_str());
            assert!(
                permission.as_str().starts_with(prefix.as_str()),
                "{}",
                permission.as_str()
            );
        }
    }

    #[test]
    fn unknown_resource_key_is_rejected() {
        assert!(Resource::parse("warehouse").is_none());
        assert!(Resource::parse("").is_none());
    }

    #[test]
    fn super_admin_holds_every_permission() {
        for permission in Permission::all() {
            assert!(
                Role::SuperAdmin.has_permission(*permission),
                "{}",
                permission.as_str()
            );
        }
    }

    #[test]
    fn viewer_holds_only_content_view() {
        for permission in Permission::all() {
            let expected = *permission == Permission::ContentView;
            assert_eq!(
                Role::Viewer.has_permission(*permission),
                expected,
                "{}",
                permission.as_str()
            );
        }
    }

    #[test]
    fn grants_are_monotonic_up_the_hierarchy() {
        let mut roles: Vec<Role> = Role::all().to_vec();
        roles.sort_by_key(|role| role.hierarchy_level());

        for pair in roles.windows(2) {
            let lower: BTreeSet<Permission> =
                role_permissions(pair[0]).iter().copied().collect();
            let upper: BTreeSet<Permission> =
                role_permissions(pair[1]).iter().copied().collect();
            assert!(
                lower.is_subset(&upper),
                "{} is not contained in {}",
                pair[0].as_str(),
                pair[1].as_str()
            );
        }
    }

    #[test]
    fn effective_permissions_expand_wildcard_role() {
        let effective = EffectivePermissions::for_role(Role::SuperAdmin);
        assert!(effective.is_super_admin);
        assert_eq!(effective.permissions.len(), Permission::all().len());
        assert!(effective.has("content:view"));
        assert!(effective.grants_resource("agency"));
    }

    #[test]
    fn effective_permissions_prefix_match_is_exact() {
        let effective = EffectivePermissions::for_role(Role::BrandAdmin);
        assert!(effective.grants_resource("brand"));
        assert!(effective.grants_resource("crm"));
        assert!(!effective.grants_resource("agency"));
        assert!(!effective.grants_resource("bra"));
    }
}
