use std::collections::BTreeMap;

use async_trait::async_trait;
use brandhive_application::{AuditLogEntry, AuditLogGateway, AuditLogQuery};
use brandhive_core::AppResult;
use serde::Deserialize;

use crate::api_client::{ApiClient, ApiConfig};

/// Audit entry shape returned by the backend.
#[derive(Debug, Deserialize)]
struct AuditLogEntryDto {
    id: i64,
    actor_email: String,
    #[serde(default)]
    target_user_email: Option<String>,
    action: String,
    #[serde(default)]
    details: BTreeMap<String, String>,
    created_at: String,
}

impl From<AuditLogEntryDto> for AuditLogEntry {
    fn from(value: AuditLogEntryDto) -> Self {
        Self {
            id: value.id,
            actor_email: value.actor_email,
            target_user_email: value.target_user_email,
            action: value.action,
            details: value.details,
            created_at: value.created_at,
        }
    }
}

/// HTTP implementation of audit log reads.
pub struct HttpAuditLogGateway {
    client: ApiClient,
}

impl HttpAuditLogGateway {
    /// Creates a new gateway from an HTTP client and connection settings.
    #[must_use]
    pub fn new(http: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            client: ApiClient::new(http, config),
        }
    }
}

#[async_trait]
impl AuditLogGateway for HttpAuditLogGateway {
    async fn list_audit_log(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let mut request = self
            .client
            .request(reqwest::Method::GET, "/api/security/audit-log")
            .query(&[("limit", query.limit), ("offset", query.offset)]);

        if let Some(action) = query.action_filter {
            request = request.query(&[("action", action.as_str())]);
        }

        let entries: Vec<AuditLogEntryDto> = self.client.send_for_json(request).await?;

        Ok(entries.into_iter().map(AuditLogEntry::from).collect())
    }
}
