//! Backend adapters for the Brandhive application ports.
//!
//! HTTP gateways talk to the hosted backend API; the in-memory gateway backs
//! local development and full-stack tests.

mod api_client;
mod http_audit_log_gateway;
mod http_authorization_gateway;
mod http_security_admin_gateway;
mod in_memory_security_gateway;

pub use api_client::ApiConfig;
pub use http_audit_log_gateway::HttpAuditLogGateway;
pub use http_authorization_gateway::HttpAuthorizationGateway;
pub use http_security_admin_gateway::HttpSecurityAdminGateway;
pub use in_memory_security_gateway::InMemorySecurityGateway;
