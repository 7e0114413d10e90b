use std::sync::Arc;

use mgmtctl_core::{AppError, AppResult, ManagementContext, NonEmptyString};
use mgmtctl_domain::{
    AssociationTargets, Job, ProtectionProfileSpec, build_create_and_associate_request,
};

use crate::cancellation::CancellationFlag;
use crate::job_projector::project_job;
use crate::operation_ports::OperationDispatcher;

/// Site recovery service that creates profiles, associates containers and reads jobs.
#[derive(Clone)]
pub struct ProtectionProfileService {
    dispatcher: Arc<dyn OperationDispatcher>,
}

impl ProtectionProfileService {
    /// Creates a protection profile service.
    #[must_use]
    pub fn new(dispatcher: Arc<dyn OperationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Creates a protection profile and associates it with the bound containers.
    ///
    /// Returns as soon as the service accepted the job. The job is not awaited.
    pub async fn start_association_job(
        &self,
        context: &ManagementContext,
        spec: &ProtectionProfileSpec,
        targets: &AssociationTargets,
        cancellation: &CancellationFlag,
    ) -> AppResult<Job> {
        let request = build_create_and_associate_request(spec, targets)?;
        cancellation.ensure_active("before dispatch")?;

        let job = self
            .dispatcher
            .create_and_associate_protection_profile(context, &request)
            .await
            .map(project_job)?;

        if cancellation.is_cancelled() {
            return Err(AppError::Cancelled(format!(
                "operation interrupted after the service accepted job '{}'",
                job.id
            )));
        }

        Ok(job)
    }

    /// Reads the current state of a job.
    pub async fn get_job(
        &self,
        context: &ManagementContext,
        job_id: &str,
        cancellation: &CancellationFlag,
    ) -> AppResult<Job> {
        let job_id = NonEmptyString::for_field("JobId", job_id)?;
        cancellation.ensure_active("before dispatch")?;

        let job = self
            .dispatcher
            .get_job(context, job_id.as_str())
            .await
            .map(project_job)?;
        cancellation.ensure_active("after the job was read")?;

        Ok(job)
    }
}
