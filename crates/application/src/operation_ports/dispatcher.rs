use async_trait::async_trait;
use mgmtctl_core::{AppResult, ManagementContext};
use mgmtctl_domain::CreateAndAssociateRequest;

use super::ServiceJob;

/// Port for long-running site recovery operations.
///
/// Implementations must not retry: the operations create remote state and are
/// not known to be idempotent.
#[async_trait]
pub trait OperationDispatcher: Send + Sync {
    /// Submits a create-and-associate request and returns once the service accepted the job.
    async fn create_and_associate_protection_profile(
        &self,
        context: &ManagementContext,
        request: &CreateAndAssociateRequest,
    ) -> AppResult<ServiceJob>;

    /// Reads the current representation of a job.
    async fn get_job(&self, context: &ManagementContext, job_id: &str) -> AppResult<ServiceJob>;
}
