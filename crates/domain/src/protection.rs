use chrono::NaiveTime;
use mgmtctl_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Replication provider that a protection profile targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReplicationProvider {
    /// Replication between two enterprise Hyper-V sites.
    HyperVReplica,
    /// Replication from an enterprise Hyper-V site into cloud storage.
    HyperVReplicaAzure,
    /// Provider identifier this client does not know about.
    Other(String),
}

impl ReplicationProvider {
    /// Returns the identifier sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::HyperVReplica => "HyperVReplica",
            Self::HyperVReplicaAzure => "HyperVReplicaAzure",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns whether replicated data lands in customer storage accounts.
    #[must_use]
    pub fn requires_remote_storage(&self) -> bool {
        matches!(self, Self::HyperVReplicaAzure)
    }
}

impl From<String> for ReplicationProvider {
    fn from(value: String) -> Self {
        match value.as_str() {
            "HyperVReplica" => Self::HyperVReplica,
            "HyperVReplicaAzure" => Self::HyperVReplicaAzure,
            _ => Self::Other(value),
        }
    }
}

impl From<ReplicationProvider> for String {
    fn from(value: ReplicationProvider) -> Self {
        match value {
            ReplicationProvider::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

/// Customer storage account that receives replicated data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    storage_account_name: NonEmptyString,
    subscription_id: NonEmptyString,
}

impl StorageAccount {
    /// Creates a validated storage account reference.
    pub fn new(
        storage_account_name: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            storage_account_name: NonEmptyString::for_field(
                "RecoveryAzureStorageAccountName",
                storage_account_name,
            )?,
            subscription_id: NonEmptyString::for_field(
                "RecoveryAzureSubscription",
                subscription_id,
            )?,
        })
    }

    /// Returns the storage account name.
    #[must_use]
    pub fn storage_account_name(&self) -> &str {
        self.storage_account_name.as_str()
    }

    /// Returns the subscription owning the storage account.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }
}

/// Provider-specific replication settings blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSettings {
    /// Hours between application-consistent snapshots.
    #[serde(rename = "appConsistencyFreq")]
    pub application_consistent_snapshot_frequency_in_hours: u32,
    /// Seconds between replication cycles.
    #[serde(rename = "replicationInterval")]
    pub replication_frequency_in_seconds: u32,
    /// Time of day at which initial replication starts, immediate when absent.
    #[serde(
        rename = "onlineIrStartTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub replication_start_time: Option<NaiveTime>,
    /// Storage targets for replicated data.
    #[serde(default)]
    pub storage_accounts: Vec<StorageAccount>,
}

/// Profile creation half of a create-and-associate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionProfileRequest {
    name: NonEmptyString,
    replication_provider: ReplicationProvider,
    #[serde(rename = "replicationProviderSettings")]
    provider_settings: ReplicationSettings,
}

impl ProtectionProfileRequest {
    /// Creates a validated profile request.
    pub fn new(
        name: NonEmptyString,
        replication_provider: ReplicationProvider,
        provider_settings: ReplicationSettings,
    ) -> AppResult<Self> {
        if replication_provider.requires_remote_storage()
            && provider_settings.storage_accounts.is_empty()
        {
            return Err(AppError::Validation(format!(
                "replication provider '{}' requires at least one recovery storage account",
                replication_provider.as_str()
            )));
        }

        Ok(Self {
            name,
            replication_provider,
            provider_settings,
        })
    }

    /// Returns the profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the replication provider.
    #[must_use]
    pub fn replication_provider(&self) -> &ReplicationProvider {
        &self.replication_provider
    }

    /// Returns the provider-specific settings.
    #[must_use]
    pub fn provider_settings(&self) -> &ReplicationSettings {
        &self.provider_settings
    }
}

/// Identifier of a protection container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(NonEmptyString);

impl ContainerId {
    /// Creates a container identifier, naming the parameter it was bound from on failure.
    pub fn new(field: &str, value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::for_field(field, value).map(Self)
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pair of containers linked under a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRequest {
    #[serde(rename = "primaryProtectionContainerId")]
    primary: ContainerId,
    #[serde(rename = "recoveryProtectionContainerId")]
    recovery: ContainerId,
}

impl AssociationRequest {
    /// Creates an association between two distinct containers.
    pub fn new(primary: ContainerId, recovery: ContainerId) -> AppResult<Self> {
        if primary == recovery {
            return Err(AppError::Validation(format!(
                "primary and recovery protection containers must differ, both are '{}'",
                primary.as_str()
            )));
        }

        Ok(Self { primary, recovery })
    }

    /// Returns the primary container.
    #[must_use]
    pub fn primary(&self) -> &ContainerId {
        &self.primary
    }

    /// Returns the recovery container.
    #[must_use]
    pub fn recovery(&self) -> &ContainerId {
        &self.recovery
    }
}

/// Where the recovery container lives relative to the primary site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssociationTopology {
    /// Recovery container is in another enterprise site.
    EnterpriseToEnterprise,
    /// Recovery container is in the cloud.
    EnterpriseToAzure,
}

impl AssociationTopology {
    /// Returns a stable name for the topology.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnterpriseToEnterprise => "EnterpriseToEnterprise",
            Self::EnterpriseToAzure => "EnterpriseToAzure",
        }
    }
}

/// Body of a create-and-associate protection profile call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAndAssociateRequest {
    #[serde(skip)]
    topology: AssociationTopology,
    #[serde(rename = "createProtectionProfileInput")]
    profile: ProtectionProfileRequest,
    #[serde(rename = "associationInput")]
    association: AssociationRequest,
}

impl CreateAndAssociateRequest {
    pub(crate) fn new(
        topology: AssociationTopology,
        profile: ProtectionProfileRequest,
        association: AssociationRequest,
    ) -> Self {
        Self {
            topology,
            profile,
            association,
        }
    }

    /// Returns the topology selected from the bound containers.
    #[must_use]
    pub fn topology(&self) -> AssociationTopology {
        self.topology
    }

    /// Returns the profile creation input.
    #[must_use]
    pub fn profile(&self) -> &ProtectionProfileRequest {
        &self.profile
    }

    /// Returns the container association input.
    #[must_use]
    pub fn association(&self) -> &AssociationRequest {
        &self.association
    }
}
