use std::collections::BTreeMap;

use async_trait::async_trait;
use brandhive_application::{
    CreateOverrideInput, OverrideSetting, RoleData, SecurityAdminGateway, UpdateOverrideInput,
};
use brandhive_core::{AppResult, UserId};
use brandhive_domain::PermissionOverride;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::api_client::{ApiClient, ApiConfig};

/// Role record shape returned by the backend.
#[derive(Debug, Deserialize)]
struct RoleRecordDto {
    id: i64,
    name: String,
    display_name: String,
    hierarchy_level: u8,
    #[serde(default)]
    is_system: bool,
    permissions_json: BTreeMap<String, Vec<String>>,
}

impl From<RoleRecordDto> for RoleData {
    fn from(value: RoleRecordDto) -> Self {
        Self {
            role_id: value.id,
            name: value.name,
            display_name: value.display_name,
            hierarchy_level: value.hierarchy_level,
            is_system: value.is_system,
            permissions: value.permissions_json,
        }
    }
}

/// HTTP implementation of override and role administration.
pub struct HttpSecurityAdminGateway {
    client: ApiClient,
}

impl HttpSecurityAdminGateway {
    /// Creates a new gateway from an HTTP client and connection settings.
    #[must_use]
    pub fn new(http: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            client: ApiClient::new(http, config),
        }
    }
}

#[async_trait]
impl SecurityAdminGateway for HttpSecurityAdminGateway {
    async fn create_override(&self, input: CreateOverrideInput) -> AppResult<PermissionOverride> {
        debug!(
            user_id = %input.user_id,
            resource = input.resource.as_str(),
            action = input.action.as_str(),
            "creating permission override"
        );

        let request = self
            .client
            .request(reqwest::Method::POST, "/api/permission-overrides")
            .json(&json!({
                "user_id": input.user_id.as_i64(),
                "resource": input.resource,
                "action": input.action.as_str(),
                "is_allowed": input.is_allowed,
            }));

        self.client.send_for_json(request).await
    }

    async fn update_override(
        &self,
        override_id: i64,
        input: UpdateOverrideInput,
    ) -> AppResult<PermissionOverride> {
        debug!(override_id, "updating permission override");

        let mut fields = Map::new();
        if let Some(action) = input.action {
            fields.insert("action".to_owned(), Value::from(action.as_str()));
        }
        if let Some(is_allowed) = input.is_allowed {
            fields.insert("is_allowed".to_owned(), Value::from(is_allowed));
        }

        let request = self
            .client
            .request(
                reqwest::Method::PATCH,
                format!("/api/permission-overrides/{override_id}").as_str(),
            )
            .json(&Value::Object(fields));

        self.client.send_for_json(request).await
    }

    async fn delete_override(&self, override_id: i64) -> AppResult<()> {
        debug!(override_id, "deleting permission override");

        let request = self.client.request(
            reqwest::Method::DELETE,
            format!("/api/permission-overrides/{override_id}").as_str(),
        );

        self.client.send_for_empty(request).await
    }

    async fn save_overrides(
        &self,
        user_id: UserId,
        entries: Vec<OverrideSetting>,
    ) -> AppResult<Vec<PermissionOverride>> {
        debug!(%user_id, entries = entries.len(), "saving override batch");

        let payload: Vec<Value> = entries
            .iter()
            .map(|entry| {
                json!({
                    "resource": entry.resource,
                    "action": entry.action.as_str(),
                    "is_allowed": entry.is_allowed,
                })
            })
            .collect();

        let request = self
            .client
            .request(
                reqwest::Method::PUT,
                format!("/api/users/{user_id}/permission-overrides").as_str(),
            )
            .json(&json!({ "overrides": payload }));

        self.client.send_for_json(request).await
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleData>> {
        let request = self.client.request(reqwest::Method::GET, "/api/security/roles");
        let records: Vec<RoleRecordDto> = self.client.send_for_json(request).await?;

        Ok(records.into_iter().map(RoleData::from).collect())
    }

    async fn update_role_permissions(
        &self,
        role_id: i64,
        permissions: BTreeMap<String, Vec<String>>,
    ) -> AppResult<()> {
        debug!(role_id, "updating role permissions");

        let request = self
            .client
            .request(
                reqwest::Method::PUT,
                format!("/api/security/roles/{role_id}/permissions").as_str(),
            )
            .json(&json!({ "permissions_json": permissions }));

        self.client.send_for_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use brandhive_application::{CreateOverrideInput, SecurityAdminGateway};
    use brandhive_core::{AppError, UserId};
    use brandhive_domain::OverrideAction;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api_client::ApiConfig;

    use super::HttpSecurityAdminGateway;

    #[tokio::test]
    async fn create_override_sends_the_row_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/permission-overrides"))
            .and(body_json(serde_json::json!({
                "user_id": 42,
                "resource": "agency",
                "action": "write",
                "is_allowed": true,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 7,
                "user_id": 42,
                "resource": "agency",
                "action": "write",
                "is_allowed": true,
            })))
            .mount(&server)
            .await;

        let gateway =
            HttpSecurityAdminGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let row = match gateway
            .create_override(CreateOverrideInput {
                user_id: UserId::new(42),
                resource: "agency".to_owned(),
                action: OverrideAction::Write,
                is_allowed: true,
            })
            .await
        {
            Ok(row) => row,
            Err(error) => panic!("create failed: {error}"),
        };

        assert_eq!(row.id, 7);
        assert_eq!(row.action, OverrideAction::Write);
    }

    #[tokio::test]
    async fn list_roles_maps_backend_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/security/roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 1,
                    "name": "super_admin",
                    "display_name": "Super Admin",
                    "hierarchy_level": 100,
                    "is_system": true,
                    "permissions_json": { "*": ["*"] },
                }
            ])))
            .mount(&server)
            .await;

        let gateway =
            HttpSecurityAdminGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let roles = match gateway.list_roles().await {
            Ok(roles) => roles,
            Err(error) => panic!("list failed: {error}"),
        };

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_id, 1);
        assert!(roles[0].holds_wildcard());
    }

    #[tokio::test]
    async fn failed_delete_is_never_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/permission-overrides/7"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "override 7 does not exist",
            })))
            .mount(&server)
            .await;

        let gateway =
            HttpSecurityAdminGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let result = gateway.delete_override(7).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
