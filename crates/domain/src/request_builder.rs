//! Builds create-and-associate payloads from flat, user-facing parameters.
//!
//! Both association topologies share a single construction path. The topology
//! is derived from which recovery container parameter was bound.

use chrono::NaiveTime;
use mgmtctl_core::{AppError, AppResult, NonEmptyString};

use crate::protection::{
    AssociationRequest, AssociationTopology, ContainerId, CreateAndAssociateRequest,
    ProtectionProfileRequest, ReplicationProvider, ReplicationSettings, StorageAccount,
};

/// Replication intervals accepted by Hyper-V replication providers.
const ALLOWED_REPLICATION_FREQUENCIES_IN_SECONDS: [u32; 3] = [30, 300, 900];

const MAX_APPLICATION_CONSISTENT_FREQUENCY_IN_HOURS: u32 = 12;

/// User-facing storage account parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccountSpec {
    /// Storage account name.
    pub storage_account_name: String,
    /// Subscription owning the storage account.
    pub subscription_id: String,
}

/// User-facing protection profile parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionProfileSpec {
    /// Profile name.
    pub name: String,
    /// Replication provider identifier.
    pub replication_provider: String,
    /// Hours between application-consistent snapshots.
    pub application_consistent_snapshot_frequency_in_hours: u32,
    /// Seconds between replication cycles.
    pub replication_frequency_in_seconds: u32,
    /// Optional initial replication start time.
    pub replication_start_time: Option<NaiveTime>,
    /// Recovery storage targets.
    pub storage_accounts: Vec<StorageAccountSpec>,
}

/// Container parameters as bound by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationTargets {
    /// Container whose workloads are protected.
    pub primary_container: Option<String>,
    /// Recovery container in another enterprise site.
    pub recovery_container: Option<String>,
    /// Recovery container in the cloud.
    pub recovery_cloud_container: Option<String>,
}

impl AssociationTargets {
    /// Selects the association topology from the bound recovery parameter.
    pub fn topology(&self) -> AppResult<AssociationTopology> {
        match (&self.recovery_container, &self.recovery_cloud_container) {
            (Some(_), None) => Ok(AssociationTopology::EnterpriseToEnterprise),
            (None, Some(_)) => Ok(AssociationTopology::EnterpriseToAzure),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "RecoveryProtectionContainer and RecoveryCloudProtectionContainer are mutually exclusive"
                    .to_owned(),
            )),
            (None, None) => Err(AppError::Validation(
                "one of RecoveryProtectionContainer or RecoveryCloudProtectionContainer is required"
                    .to_owned(),
            )),
        }
    }

    fn resolve(&self) -> AppResult<(AssociationTopology, AssociationRequest)> {
        let primary = self.primary_container.as_deref().ok_or_else(|| {
            AppError::Validation("PrimaryProtectionContainer is required".to_owned())
        })?;
        let primary = ContainerId::new("PrimaryProtectionContainer", primary)?;

        let topology = self.topology()?;
        let recovery = match topology {
            AssociationTopology::EnterpriseToEnterprise => ContainerId::new(
                "RecoveryProtectionContainer",
                self.recovery_container.clone().unwrap_or_default(),
            )?,
            AssociationTopology::EnterpriseToAzure => ContainerId::new(
                "RecoveryCloudProtectionContainer",
                self.recovery_cloud_container.clone().unwrap_or_default(),
            )?,
        };

        Ok((topology, AssociationRequest::new(primary, recovery)?))
    }
}

/// Builds a validated create-and-associate request.
pub fn build_create_and_associate_request(
    spec: &ProtectionProfileSpec,
    targets: &AssociationTargets,
) -> AppResult<CreateAndAssociateRequest> {
    let (topology, association) = targets.resolve()?;
    let name = NonEmptyString::for_field("ProtectionProfile name", spec.name.as_str())?;
    let provider = ReplicationProvider::from(String::from(NonEmptyString::for_field(
        "ReplicationProvider",
        spec.replication_provider.as_str(),
    )?));

    if topology == AssociationTopology::EnterpriseToAzure && !provider.requires_remote_storage() {
        return Err(AppError::Validation(format!(
            "replication provider '{}' cannot replicate to a cloud recovery container",
            provider.as_str()
        )));
    }

    let settings = build_replication_settings(spec)?;
    let profile = ProtectionProfileRequest::new(name, provider, settings)?;

    Ok(CreateAndAssociateRequest::new(
        topology,
        profile,
        association,
    ))
}

fn build_replication_settings(spec: &ProtectionProfileSpec) -> AppResult<ReplicationSettings> {
    if !ALLOWED_REPLICATION_FREQUENCIES_IN_SECONDS.contains(&spec.replication_frequency_in_seconds)
    {
        return Err(AppError::Validation(format!(
            "ReplicationFrequencyInSeconds must be one of {ALLOWED_REPLICATION_FREQUENCIES_IN_SECONDS:?}, got {}",
            spec.replication_frequency_in_seconds
        )));
    }

    if spec.application_consistent_snapshot_frequency_in_hours
        > MAX_APPLICATION_CONSISTENT_FREQUENCY_IN_HOURS
    {
        return Err(AppError::Validation(format!(
            "ApplicationConsistentSnapshotFrequencyInHours must be between 0 and {MAX_APPLICATION_CONSISTENT_FREQUENCY_IN_HOURS}, got {}",
            spec.application_consistent_snapshot_frequency_in_hours
        )));
    }

    let storage_accounts = spec
        .storage_accounts
        .iter()
        .map(|account| {
            StorageAccount::new(
                account.storage_account_name.as_str(),
                account.subscription_id.as_str(),
            )
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ReplicationSettings {
        application_consistent_snapshot_frequency_in_hours: spec
            .application_consistent_snapshot_frequency_in_hours,
        replication_frequency_in_seconds: spec.replication_frequency_in_seconds,
        replication_start_time: spec.replication_start_time,
        storage_accounts,
    })
}
