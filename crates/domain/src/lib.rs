//! Domain entities and invariants for the Brandhive authorization core.

#![forbid(unsafe_code)]

mod audit;
mod overrides;
mod permission;
mod role;

pub use audit::AuditAction;
pub use overrides::{
    OverrideAction, OverrideTransition, PermissionOverride, ResourceAccessState, find_override,
};
pub use permission::{EffectivePermissions, Permission, Resource, role_permissions};
pub use role::{Role, RoleOption, has_permission, has_role, role_options};
