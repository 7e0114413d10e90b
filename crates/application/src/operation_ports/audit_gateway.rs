use async_trait::async_trait;
use mgmtctl_core::{AppResult, ManagementContext};
use mgmtctl_domain::{AuditPolicySettings, DatabaseCoordinates};

/// Port for database audit settings.
#[async_trait]
pub trait AuditPolicyGateway: Send + Sync {
    /// Reads the audit settings of a database.
    async fn get_database_audit_settings(
        &self,
        context: &ManagementContext,
        coordinates: &DatabaseCoordinates,
    ) -> AppResult<AuditPolicySettings>;

    /// Replaces the audit settings of a database and returns the stored settings.
    async fn put_database_audit_settings(
        &self,
        context: &ManagementContext,
        coordinates: &DatabaseCoordinates,
        settings: &AuditPolicySettings,
    ) -> AppResult<AuditPolicySettings>;
}
