use async_trait::async_trait;
use brandhive_application::AuthorizationGateway;
use brandhive_core::{AppResult, UserId};
use brandhive_domain::{EffectivePermissions, PermissionOverride};

use crate::api_client::{ApiClient, ApiConfig};

/// HTTP implementation of read-side permission lookups.
pub struct HttpAuthorizationGateway {
    client: ApiClient,
}

impl HttpAuthorizationGateway {
    /// Creates a new gateway from an HTTP client and connection settings.
    #[must_use]
    pub fn new(http: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            client: ApiClient::new(http, config),
        }
    }
}

#[async_trait]
impl AuthorizationGateway for HttpAuthorizationGateway {
    async fn get_user_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let request = self.client.request(
            reqwest::Method::GET,
            format!("/api/users/{user_id}/permissions").as_str(),
        );

        self.client.send_for_json(request).await
    }

    async fn list_user_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionOverride>> {
        let request = self.client.request(
            reqwest::Method::GET,
            format!("/api/users/{user_id}/permission-overrides").as_str(),
        );

        self.client.send_for_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use brandhive_application::AuthorizationGateway;
    use brandhive_core::{AppError, UserId};
    use brandhive_domain::OverrideAction;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api_client::ApiConfig;

    use super::HttpAuthorizationGateway;

    #[tokio::test]
    async fn fetches_effective_permissions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/42/permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_super_admin": false,
                "permissions": ["brand:view", "brand:manage"],
            })))
            .mount(&server)
            .await;

        let gateway =
            HttpAuthorizationGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let permissions = match gateway.get_user_permissions(UserId::new(42)).await {
            Ok(permissions) => permissions,
            Err(error) => panic!("fetch failed: {error}"),
        };

        assert!(!permissions.is_super_admin);
        assert!(permissions.has("brand:manage"));
        assert!(permissions.grants_resource("brand"));
        assert!(!permissions.grants_resource("agency"));
    }

    #[tokio::test]
    async fn deserializes_override_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/42/permission-overrides"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 9,
                    "user_id": 42,
                    "resource": "agency",
                    "action": "write",
                    "is_allowed": true,
                }
            ])))
            .mount(&server)
            .await;

        let gateway =
            HttpAuthorizationGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let rows = match gateway.list_user_overrides(UserId::new(42)).await {
            Ok(rows) => rows,
            Err(error) => panic!("fetch failed: {error}"),
        };

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource, "agency");
        assert_eq!(rows[0].action, OverrideAction::Write);
    }

    #[tokio::test]
    async fn surfaces_backend_forbidden_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/42/permissions"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "session lacks security.role.manage",
            })))
            .mount(&server)
            .await;

        let gateway =
            HttpAuthorizationGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let result = gateway.get_user_permissions(UserId::new(42)).await;

        match result {
            Err(AppError::Forbidden(message)) => {
                assert_eq!(message, "session lacks security.role.manage");
            }
            other => panic!("expected forbidden error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_override_action_classifies_as_denial() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/42/permission-overrides"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 9,
                    "user_id": 42,
                    "resource": "agency",
                    "action": "administer",
                    "is_allowed": true,
                }
            ])))
            .mount(&server)
            .await;

        let gateway =
            HttpAuthorizationGateway::new(reqwest::Client::new(), ApiConfig::new(server.uri()));

        let rows = match gateway.list_user_overrides(UserId::new(42)).await {
            Ok(rows) => rows,
            Err(error) => panic!("fetch failed: {error}"),
        };

        assert_eq!(rows[0].action, OverrideAction::None);
        assert!(rows[0].is_denial());
    }
}
