use async_trait::async_trait;
use mgmtctl_application::AuditPolicyGateway;
use mgmtctl_core::{AppResult, ManagementContext};
use mgmtctl_domain::{AuditPolicySettings, DatabaseCoordinates};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::http_management_client::HttpManagementClient;

#[derive(Debug, Deserialize)]
struct AuditingSettingsResource {
    properties: AuditPolicySettings,
}

#[derive(Debug, Serialize)]
struct AuditingSettingsBody<'a> {
    properties: &'a AuditPolicySettings,
}

/// HTTP implementation of the database audit settings port.
pub struct HttpAuditPolicyGateway {
    client: HttpManagementClient,
    api_version: String,
}

impl HttpAuditPolicyGateway {
    /// Creates an audit settings gateway.
    #[must_use]
    pub fn new(client: HttpManagementClient, api_version: impl Into<String>) -> Self {
        Self {
            client,
            api_version: api_version.into(),
        }
    }

    fn auditing_settings_url(
        &self,
        context: &ManagementContext,
        coordinates: &DatabaseCoordinates,
    ) -> AppResult<Url> {
        self.client.resource_url(
            &[
                "subscriptions",
                context.subscription_id(),
                "resourceGroups",
                coordinates.resource_group_name(),
                "providers",
                "Microsoft.Sql",
                "servers",
                coordinates.server_name(),
                "databases",
                coordinates.database_name(),
                "auditingSettings",
                "default",
            ],
            self.api_version.as_str(),
        )
    }
}

#[async_trait]
impl AuditPolicyGateway for HttpAuditPolicyGateway {
    async fn get_database_audit_settings(
        &self,
        context: &ManagementContext,
        coordinates: &DatabaseCoordinates,
    ) -> AppResult<AuditPolicySettings> {
        let url = self.auditing_settings_url(context, coordinates)?;
        let resource: AuditingSettingsResource = self.client.get_json(context, url).await?;
        Ok(resource.properties)
    }

    async fn put_database_audit_settings(
        &self,
        context: &ManagementContext,
        coordinates: &DatabaseCoordinates,
        settings: &AuditPolicySettings,
    ) -> AppResult<AuditPolicySettings> {
        let url = self.auditing_settings_url(context, coordinates)?;
        let resource: AuditingSettingsResource = self
            .client
            .send_json(
                context,
                reqwest::Method::PUT,
                url,
                &AuditingSettingsBody {
                    properties: settings,
                },
            )
            .await?;

        info!(
            resource_group = coordinates.resource_group_name(),
            server = coordinates.server_name(),
            database = coordinates.database_name(),
            state = resource.properties.state.as_str(),
            "database audit settings updated"
        );

        Ok(resource.properties)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use mgmtctl_application::AuditPolicyGateway;
    use mgmtctl_core::{AppError, ManagementContext};
    use mgmtctl_domain::{AuditState, DatabaseCoordinates};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    use super::HttpAuditPolicyGateway;
    use crate::http_management_client::HttpManagementClient;
    use crate::stub_endpoint;

    const SETTINGS_PATH: &str = "/subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.Sql/servers/{server}/databases/{database}/auditingSettings/default";

    type Databases = Arc<Mutex<HashMap<String, Value>>>;
    type SettingsPath = Path<(String, String, String, String)>;

    async fn read_settings(
        State(databases): State<Databases>,
        Path((_subscription, _group, _server, database)): SettingsPath,
    ) -> (StatusCode, Json<Value>) {
        match databases.lock().await.get(&database) {
            Some(properties) => (StatusCode::OK, Json(json!({"properties": properties}))),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": "ResourceNotFound", "message": "database not found"}})),
            ),
        }
    }

    async fn write_settings(
        State(databases): State<Databases>,
        Path((_subscription, _group, _server, database)): SettingsPath,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let properties = body.get("properties").cloned().unwrap_or(Value::Null);
        databases
            .lock()
            .await
            .insert(database, properties.clone());
        (StatusCode::OK, Json(json!({"properties": properties})))
    }

    async fn gateway(databases: Databases) -> HttpAuditPolicyGateway {
        let router = Router::new()
            .route(SETTINGS_PATH, get(read_settings).put(write_settings))
            .with_state(databases);
        let base_url = stub_endpoint::serve(router).await;

        match HttpManagementClient::new(reqwest::Client::new(), &base_url) {
            Ok(client) => HttpAuditPolicyGateway::new(client, "2021-11-01"),
            Err(error) => panic!("stub client should be valid: {error}"),
        }
    }

    fn context() -> ManagementContext {
        match ManagementContext::new("sub-123", "token") {
            Ok(context) => context,
            Err(error) => panic!("test context should be valid: {error}"),
        }
    }

    fn coordinates(database: &str) -> DatabaseCoordinates {
        match DatabaseCoordinates::new("rg1", "srv1", database) {
            Ok(coordinates) => coordinates,
            Err(error) => panic!("coordinates should be valid: {error}"),
        }
    }

    #[tokio::test]
    async fn missing_database_maps_to_not_found() {
        let gateway = gateway(Databases::default()).await;

        let result = gateway
            .get_database_audit_settings(&context(), &coordinates("db1"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn reads_and_replaces_settings() {
        let databases = Databases::default();
        databases.lock().await.insert(
            "db1".to_owned(),
            json!({
                "state": "Disabled",
                "retentionDays": 0,
                "auditActionsAndGroups": [],
                "isManagedIdentityInUse": false
            }),
        );
        let gateway = gateway(databases.clone()).await;

        let current = gateway
            .get_database_audit_settings(&context(), &coordinates("db1"))
            .await;
        let Ok(mut settings) = current else {
            panic!("settings should be read");
        };
        assert_eq!(settings.state, AuditState::Disabled);

        settings.state = AuditState::Enabled;
        settings.storage_endpoint = Some("https://sa1.blob.core.windows.net".to_owned());
        let stored = gateway
            .put_database_audit_settings(&context(), &coordinates("db1"), &settings)
            .await;

        assert_eq!(stored.map(|stored| stored.state).ok(), Some(AuditState::Enabled));
        let written = databases.lock().await.get("db1").cloned().unwrap_or_default();
        assert_eq!(written["storageEndpoint"], "https://sa1.blob.core.windows.net");
        assert_eq!(written["isManagedIdentityInUse"], false);
    }
}
