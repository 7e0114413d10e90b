//! Domain models and request builders for management operations.

#![forbid(unsafe_code)]

mod audit;
mod job;
mod protection;
mod request_builder;

pub use audit::{
    AuditPolicyRequest, AuditPolicySettings, AuditPolicyUpdate, AuditState, CoordinateSource,
    DEFAULT_AUDIT_ACTION_GROUPS, DatabaseCoordinates, DatabaseResource, MAX_AUDIT_RETENTION_DAYS,
};
pub use job::{Job, JobError, JobState, JobTimestamp};
pub use protection::{
    AssociationRequest, AssociationTopology, ContainerId, CreateAndAssociateRequest,
    ProtectionProfileRequest, ReplicationProvider, ReplicationSettings, StorageAccount,
};
pub use request_builder::{
    AssociationTargets, ProtectionProfileSpec, StorageAccountSpec,
    build_create_and_associate_request,
};
