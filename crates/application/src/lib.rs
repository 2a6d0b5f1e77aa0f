//! Application services and ports for the Brandhive authorization core.

#![forbid(unsafe_code)]

mod authorization_service;
mod security_admin_service;

pub use authorization_service::{AccessContext, AuthorizationGateway, AuthorizationService};
pub use security_admin_service::{
    AuditLogEntry, AuditLogGateway, AuditLogQuery, CreateOverrideInput, OverrideCycleOutcome,
    OverrideSetting, RoleData, SecurityAdminGateway, SecurityAdminService, UpdateOverrideInput,
};
