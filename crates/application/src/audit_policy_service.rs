use std::sync::Arc;

use mgmtctl_core::{AppError, AppResult, ManagementContext};
use mgmtctl_domain::{AuditPolicyRequest, AuditPolicyUpdate, CoordinateSource};

use crate::cancellation::CancellationFlag;
use crate::operation_ports::AuditPolicyGateway;

/// Database auditing service for the read and write paths.
#[derive(Clone)]
pub struct AuditPolicyService {
    gateway: Arc<dyn AuditPolicyGateway>,
}

impl AuditPolicyService {
    /// Creates an audit policy service.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuditPolicyGateway>) -> Self {
        Self { gateway }
    }

    /// Reads the current audit policy of a database.
    pub async fn get_database_audit_policy(
        &self,
        context: &ManagementContext,
        source: &CoordinateSource,
        cancellation: &CancellationFlag,
    ) -> AppResult<AuditPolicyRequest> {
        let coordinates = source.resolve()?;
        cancellation.ensure_active("before dispatch")?;

        let settings = self
            .gateway
            .get_database_audit_settings(context, &coordinates)
            .await?;
        cancellation.ensure_active("after the audit settings were read")?;

        Ok(AuditPolicyRequest::new(coordinates, settings))
    }

    /// Applies a partial change on top of the current audit policy of a database.
    pub async fn set_database_audit_policy(
        &self,
        context: &ManagementContext,
        source: &CoordinateSource,
        update: AuditPolicyUpdate,
        cancellation: &CancellationFlag,
    ) -> AppResult<AuditPolicyRequest> {
        if update.is_empty() {
            return Err(AppError::Validation(
                "at least one audit policy setting must be supplied".to_owned(),
            ));
        }

        let coordinates = source.resolve()?;
        cancellation.ensure_active("before dispatch")?;

        let current = self
            .gateway
            .get_database_audit_settings(context, &coordinates)
            .await?;
        let desired = current.apply(update)?;
        cancellation.ensure_active("before the audit settings were written")?;

        let stored = self
            .gateway
            .put_database_audit_settings(context, &coordinates, &desired)
            .await?;

        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled(format!(
                "operation interrupted after the audit settings of database '{}' were written",
                coordinates.database_name()
            )));
        }

        Ok(AuditPolicyRequest::new(coordinates, stored))
    }
}
