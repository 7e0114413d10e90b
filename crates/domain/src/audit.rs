use mgmtctl_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action groups audited when auditing is enabled without an explicit selection.
pub const DEFAULT_AUDIT_ACTION_GROUPS: [&str; 3] = [
    "SUCCESSFUL_DATABASE_AUTHENTICATION_GROUP",
    "FAILED_DATABASE_AUTHENTICATION_GROUP",
    "BATCH_COMPLETED_GROUP",
];

/// Upper bound accepted by the service for audit log retention.
pub const MAX_AUDIT_RETENTION_DAYS: u32 = 3285;

/// Fully resolved location of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCoordinates {
    resource_group_name: NonEmptyString,
    server_name: NonEmptyString,
    database_name: NonEmptyString,
}

impl DatabaseCoordinates {
    /// Creates validated database coordinates.
    pub fn new(
        resource_group_name: impl Into<String>,
        server_name: impl Into<String>,
        database_name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            resource_group_name: NonEmptyString::for_field(
                "ResourceGroupName",
                resource_group_name,
            )?,
            server_name: NonEmptyString::for_field("ServerName", server_name)?,
            database_name: NonEmptyString::for_field("DatabaseName", database_name)?,
        })
    }

    /// Returns the resource group name.
    #[must_use]
    pub fn resource_group_name(&self) -> &str {
        self.resource_group_name.as_str()
    }

    /// Returns the server name.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.server_name.as_str()
    }

    /// Returns the database name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.database_name.as_str()
    }
}

/// Database resource object bound by the caller, usually the output of another command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResource {
    /// Resource group containing the server.
    pub resource_group_name: String,
    /// Logical server name.
    pub server_name: String,
    /// Database name.
    pub database_name: String,
    /// Region of the database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Service-assigned database identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

impl DatabaseResource {
    /// Returns the coordinates carried by the resource object.
    pub fn coordinates(&self) -> AppResult<DatabaseCoordinates> {
        DatabaseCoordinates::new(
            self.resource_group_name.as_str(),
            self.server_name.as_str(),
            self.database_name.as_str(),
        )
    }
}

/// Coordinate parameters as bound by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateSource {
    /// Explicit resource group name.
    pub resource_group_name: Option<String>,
    /// Explicit server name.
    pub server_name: Option<String>,
    /// Explicit database name.
    pub database_name: Option<String>,
    /// Bound database resource object.
    pub database_object: Option<DatabaseResource>,
}

impl CoordinateSource {
    /// Resolves coordinates, preferring the resource object over the explicit triple.
    pub fn resolve(&self) -> AppResult<DatabaseCoordinates> {
        if let Some(database_object) = &self.database_object {
            return database_object.coordinates();
        }

        if self.resource_group_name.is_none()
            && self.server_name.is_none()
            && self.database_name.is_none()
        {
            return Err(AppError::Validation(
                "either ResourceGroupName, ServerName and DatabaseName or DatabaseObject is required"
                    .to_owned(),
            ));
        }

        DatabaseCoordinates::new(
            required_part("ResourceGroupName", self.resource_group_name.as_deref())?,
            required_part("ServerName", self.server_name.as_deref())?,
            required_part("DatabaseName", self.database_name.as_deref())?,
        )
    }
}

fn required_part<'a>(field: &str, value: Option<&'a str>) -> AppResult<&'a str> {
    value.ok_or_else(|| {
        AppError::Validation(format!(
            "{field} is required when DatabaseObject is not supplied"
        ))
    })
}

/// Auditing state of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditState {
    /// Access is being logged.
    Enabled,
    /// Access is not being logged.
    Disabled,
    /// State value this client does not know about.
    Other(String),
}

impl AuditState {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for AuditState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Enabled" => Self::Enabled,
            "Disabled" => Self::Disabled,
            _ => Self::Other(value),
        }
    }
}

impl From<AuditState> for String {
    fn from(value: AuditState) -> Self {
        match value {
            AuditState::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

/// Database audit settings as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPolicySettings {
    /// Auditing state.
    pub state: AuditState,
    /// Blob endpoint receiving audit logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_endpoint: Option<String>,
    /// Subscription owning the storage account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_subscription_id: Option<String>,
    /// Days to keep audit logs, zero keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    /// Audited action groups and actions.
    #[serde(default)]
    pub audit_actions_and_groups: Vec<String>,
    /// Whether logs are also sent to Azure Monitor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_azure_monitor_target_enabled: Option<bool>,
    /// Whether the storage secondary key is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_storage_secondary_key_in_use: Option<bool>,
    /// Properties returned by the service that this client does not model.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

impl AuditPolicySettings {
    /// Checks the invariants the service enforces on write.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(retention_days) = self.retention_days
            && retention_days > MAX_AUDIT_RETENTION_DAYS
        {
            return Err(AppError::Validation(format!(
                "RetentionInDays must be at most {MAX_AUDIT_RETENTION_DAYS}, got {retention_days}"
            )));
        }

        let has_storage_target = self
            .storage_endpoint
            .as_deref()
            .is_some_and(|endpoint| !endpoint.trim().is_empty());
        let has_monitor_target = self.is_azure_monitor_target_enabled.unwrap_or(false);

        if self.state == AuditState::Enabled && !has_storage_target && !has_monitor_target {
            return Err(AppError::Validation(
                "enabled auditing requires a StorageEndpoint or the Azure Monitor target"
                    .to_owned(),
            ));
        }

        Ok(())
    }

    /// Applies a partial update on top of the current settings.
    pub fn apply(mut self, update: AuditPolicyUpdate) -> AppResult<Self> {
        if let Some(state) = update.state {
            self.state = state;
        }
        if let Some(storage_endpoint) = update.storage_endpoint {
            self.storage_endpoint = Some(storage_endpoint);
        }
        if let Some(subscription_id) = update.storage_account_subscription_id {
            self.storage_account_subscription_id = Some(subscription_id);
        }
        if let Some(retention_days) = update.retention_days {
            self.retention_days = Some(retention_days);
        }
        if let Some(groups) = update.audit_actions_and_groups {
            self.audit_actions_and_groups = groups;
        }
        if let Some(enabled) = update.is_azure_monitor_target_enabled {
            self.is_azure_monitor_target_enabled = Some(enabled);
        }
        if let Some(in_use) = update.is_storage_secondary_key_in_use {
            self.is_storage_secondary_key_in_use = Some(in_use);
        }

        if self.state == AuditState::Enabled && self.audit_actions_and_groups.is_empty() {
            self.audit_actions_and_groups = DEFAULT_AUDIT_ACTION_GROUPS
                .iter()
                .map(|group| (*group).to_owned())
                .collect();
        }

        self.validate()?;
        Ok(self)
    }
}

/// Partial audit settings change requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditPolicyUpdate {
    /// New auditing state.
    pub state: Option<AuditState>,
    /// New blob endpoint.
    pub storage_endpoint: Option<String>,
    /// New storage subscription.
    pub storage_account_subscription_id: Option<String>,
    /// New retention.
    pub retention_days: Option<u32>,
    /// Replacement action groups.
    pub audit_actions_and_groups: Option<Vec<String>>,
    /// New Azure Monitor flag.
    pub is_azure_monitor_target_enabled: Option<bool>,
    /// New secondary key flag.
    pub is_storage_secondary_key_in_use: Option<bool>,
}

impl AuditPolicyUpdate {
    /// Returns whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Audit policy of one database, used for inspection and as a base for updates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPolicyRequest {
    #[serde(flatten)]
    coordinates: DatabaseCoordinates,
    #[serde(flatten)]
    settings: AuditPolicySettings,
}

impl AuditPolicyRequest {
    /// Creates a record for the given database.
    #[must_use]
    pub fn new(coordinates: DatabaseCoordinates, settings: AuditPolicySettings) -> Self {
        Self {
            coordinates,
            settings,
        }
    }

    /// Returns the database coordinates.
    #[must_use]
    pub fn coordinates(&self) -> &DatabaseCoordinates {
        &self.coordinates
    }

    /// Returns the audit settings.
    #[must_use]
    pub fn settings(&self) -> &AuditPolicySettings {
        &self.settings
    }

    /// Splits the record into its parts.
    #[must_use]
    pub fn into_parts(self) -> (DatabaseCoordinates, AuditPolicySettings) {
        (self.coordinates, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use mgmtctl_core::AppError;
    use proptest::prelude::*;
    use serde_json::Map;

    use super::{
        AuditPolicySettings, AuditPolicyUpdate, AuditState, CoordinateSource,
        DEFAULT_AUDIT_ACTION_GROUPS, DatabaseResource,
    };

    fn disabled_settings() -> AuditPolicySettings {
        AuditPolicySettings {
            state: AuditState::Disabled,
            storage_endpoint: None,
            storage_account_subscription_id: None,
            retention_days: None,
            audit_actions_and_groups: Vec::new(),
            is_azure_monitor_target_enabled: None,
            is_storage_secondary_key_in_use: None,
            additional_properties: Map::new(),
        }
    }

    #[test]
    fn explicit_triple_resolves() {
        let source = CoordinateSource {
            resource_group_name: Some("rg1".to_owned()),
            server_name: Some("srv1".to_owned()),
            database_name: Some("db1".to_owned()),
            database_object: None,
        };

        let Ok(coordinates) = source.resolve() else {
            panic!("coordinates should resolve");
        };
        assert_eq!(coordinates.resource_group_name(), "rg1");
        assert_eq!(coordinates.server_name(), "srv1");
        assert_eq!(coordinates.database_name(), "db1");
    }

    #[test]
    fn partial_triple_names_missing_field() {
        let source = CoordinateSource {
            resource_group_name: Some("rg1".to_owned()),
            server_name: None,
            database_name: Some("db1".to_owned()),
            database_object: None,
        };

        assert!(matches!(
            source.resolve(),
            Err(AppError::Validation(message)) if message.contains("ServerName")
        ));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(
            CoordinateSource::default().resolve(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unknown_state_is_preserved_on_the_wire() {
        let settings = serde_json::from_value::<AuditPolicySettings>(serde_json::json!({
            "state": "Paused",
            "auditActionsAndGroups": ["BATCH_COMPLETED_GROUP"],
            "predicateExpression": "statement <> 'select 1'"
        }));

        let Ok(settings) = settings else {
            panic!("settings should decode");
        };
        assert_eq!(settings.state, AuditState::Other("Paused".to_owned()));

        let encoded = serde_json::to_value(&settings).unwrap_or_default();
        assert_eq!(encoded["state"], "Paused");
        assert_eq!(encoded["predicateExpression"], "statement <> 'select 1'");
    }

    #[test]
    fn enabling_without_target_is_rejected() {
        let result = disabled_settings().apply(AuditPolicyUpdate {
            state: Some(AuditState::Enabled),
            ..AuditPolicyUpdate::default()
        });

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn enabling_applies_default_action_groups() {
        let result = disabled_settings().apply(AuditPolicyUpdate {
            state: Some(AuditState::Enabled),
            storage_endpoint: Some("https://sa1.blob.core.windows.net".to_owned()),
            retention_days: Some(30),
            ..AuditPolicyUpdate::default()
        });

        let Ok(settings) = result else {
            panic!("update should apply");
        };
        assert_eq!(
            settings.audit_actions_and_groups,
            DEFAULT_AUDIT_ACTION_GROUPS.map(str::to_owned).to_vec()
        );
        assert_eq!(settings.retention_days, Some(30));
    }

    #[test]
    fn blank_endpoint_of_disabled_database_accepts_retention_change() {
        let settings = serde_json::from_value::<AuditPolicySettings>(serde_json::json!({
            "state": "Disabled",
            "storageEndpoint": "",
            "retentionDays": 0,
            "auditActionsAndGroups": []
        }));
        let Ok(settings) = settings else {
            panic!("settings should decode");
        };

        let result = settings.apply(AuditPolicyUpdate {
            retention_days: Some(30),
            ..AuditPolicyUpdate::default()
        });

        let Ok(settings) = result else {
            panic!("retention change should apply");
        };
        assert_eq!(settings.retention_days, Some(30));
        assert_eq!(settings.storage_endpoint.as_deref(), Some(""));
        assert_eq!(settings.state, AuditState::Disabled);
    }

    #[test]
    fn enabling_with_blank_endpoint_still_needs_a_target() {
        let mut settings = disabled_settings();
        settings.storage_endpoint = Some("  ".to_owned());

        let result = settings.apply(AuditPolicyUpdate {
            state: Some(AuditState::Enabled),
            ..AuditPolicyUpdate::default()
        });

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn retention_above_limit_is_rejected() {
        let mut settings = disabled_settings();
        settings.retention_days = Some(4000);
        assert!(settings.validate().is_err());
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,7}"
    }

    proptest! {
        #[test]
        fn database_object_takes_precedence(
            explicit in proptest::option::of((name(), name(), name())),
            object in (name(), name(), name()),
        ) {
            let database_object = DatabaseResource {
                resource_group_name: object.0.clone(),
                server_name: object.1.clone(),
                database_name: object.2.clone(),
                location: None,
                database_id: None,
            };
            let object_only = CoordinateSource {
                database_object: Some(database_object.clone()),
                ..CoordinateSource::default()
            };
            let both = CoordinateSource {
                resource_group_name: explicit.as_ref().map(|value| value.0.clone()),
                server_name: explicit.as_ref().map(|value| value.1.clone()),
                database_name: explicit.as_ref().map(|value| value.2.clone()),
                database_object: Some(database_object),
            };

            let expected = object_only.resolve().ok();
            prop_assert!(expected.is_some());
            prop_assert_eq!(both.resolve().ok(), expected);
        }
    }
}
