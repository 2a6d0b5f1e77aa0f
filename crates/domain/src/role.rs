use std::str::FromStr;

use brandhive_core::AppError;
use serde::{Deserialize, Serialize};

use crate::permission::{Permission, role_permissions};

/// Hierarchy level assumed for a required role that is not recognized.
///
/// An unknown requirement resolves to the maximum level, so no ordinary role
/// can satisfy it.
const UNKNOWN_REQUIRED_LEVEL: u8 = 100;

/// Identity tier assigned to every dashboard user.
///
/// Roles are ordered from least to most authority:
/// Viewer < Creator < BrandMember < BrandAdmin < AgencyMember < AgencyAdmin < SuperAdmin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only access to shared content.
    Viewer,
    /// External creator producing content for brands.
    Creator,
    /// Member of a single brand workspace.
    BrandMember,
    /// Administrator of a single brand workspace.
    BrandAdmin,
    /// Agency staff working across all brands of the agency.
    AgencyMember,
    /// Agency administrator managing brands, team, and settings.
    AgencyAdmin,
    /// Platform operator with unrestricted access (wildcard role).
    SuperAdmin,
}

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Creator => "creator",
            Self::BrandMember => "brand_member",
            Self::BrandAdmin => "brand_admin",
            Self::AgencyMember => "agency_member",
            Self::AgencyAdmin => "agency_admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Resolves a stored role name, returning `None` for unknown values.
    #[must_use]
    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "viewer" => Some(Self::Viewer),
            "creator" => Some(Self::Creator),
            "brand_member" => Some(Self::BrandMember),
            "brand_admin" => Some(Self::BrandAdmin),
            "agency_member" => Some(Self::AgencyMember),
            "agency_admin" => Some(Self::AgencyAdmin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns the authority level used for meets-or-exceeds checks.
    #[must_use]
    pub fn hierarchy_level(&self) -> u8 {
        match self {
            Self::Viewer => 10,
            Self::Creator => 20,
            Self::BrandMember => 40,
            Self::BrandAdmin => 50,
            Self::AgencyMember => 60,
            Self::AgencyAdmin => 80,
            Self::SuperAdmin => 100,
        }
    }

    /// Returns the human-readable label for this role.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Creator => "Creator",
            Self::BrandMember => "Brand Member",
            Self::BrandAdmin => "Brand Admin",
            Self::AgencyMember => "Agency Member",
            Self::AgencyAdmin => "Agency Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }

    /// Returns all canonical roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Viewer,
            Role::Creator,
            Role::BrandMember,
            Role::BrandAdmin,
            Role::AgencyMember,
            Role::AgencyAdmin,
            Role::SuperAdmin,
        ];

        ALL
    }

    /// Returns whether this role bypasses all permission checks.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Returns whether this role belongs to the agency staff set.
    ///
    /// This is fixed-set membership, not a hierarchy comparison.
    #[must_use]
    pub fn is_agency_level(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::AgencyAdmin | Self::AgencyMember)
    }

    /// Returns whether this role belongs to the brand staff set.
    ///
    /// The brand set is the agency set plus brand admins and members.
    #[must_use]
    pub fn is_brand_level(&self) -> bool {
        self.is_agency_level() || matches!(self, Self::BrandAdmin | Self::BrandMember)
    }

    /// Returns whether this role's default grants include the permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        role_permissions(*self).contains(&permission)
    }

    /// Returns whether this role's default grants cover any action on the resource.
    #[must_use]
    pub fn grants_resource(&self, resource: &str) -> bool {
        role_permissions(*self)
            .iter()
            .any(|permission| permission.resource().as_str() == resource)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_name(value)
            .ok_or_else(|| AppError::Validation(format!("unknown role value '{value}'")))
    }
}

/// Role entry for selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOption {
    /// Stable role name.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

/// Returns all canonical roles as `{value, label}` pairs.
#[must_use]
pub fn role_options() -> Vec<RoleOption> {
    Role::all()
        .iter()
        .map(|role| RoleOption {
            value: role.as_str().to_owned(),
            label: role.display_name().to_owned(),
        })
        .collect()
}

/// Returns whether `user_role` meets or exceeds `required_role`.
///
/// Unknown user roles resolve to level 0 and unknown required roles to the
/// maximum level, so unrecognized input always fails closed.
#[must_use]
pub fn has_role(user_role: &str, required_role: &str) -> bool {
    let user_level = Role::from_name(user_role).map_or(0, |role| role.hierarchy_level());
    let required_level = Role::from_name(required_role)
        .map_or(UNKNOWN_REQUIRED_LEVEL, |role| role.hierarchy_level());

    user_level >= required_level
}

/// Returns whether the named role's default grants include the permission string.
///
/// Unknown roles and unparseable permission strings yield `false`.
#[must_use]
pub fn has_permission(role: &str, permission: &str) -> bool {
    match (Role::from_name(role), Permission::parse(permission)) {
        (Some(role), Some(permission)) => role.has_permission(permission),
        _ => false,
    }
}
