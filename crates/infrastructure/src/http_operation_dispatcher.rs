use async_trait::async_trait;
use mgmtctl_application::{OperationDispatcher, ServiceJob};
use mgmtctl_core::{AppResult, ManagementContext, NonEmptyString};
use mgmtctl_domain::CreateAndAssociateRequest;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::http_management_client::HttpManagementClient;

/// Site recovery vault that owns protection profiles and jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryVault {
    resource_group_name: NonEmptyString,
    vault_name: NonEmptyString,
}

impl RecoveryVault {
    /// Creates a validated vault reference.
    pub fn new(
        resource_group_name: impl Into<String>,
        vault_name: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            resource_group_name: NonEmptyString::for_field(
                "recovery vault resource group",
                resource_group_name,
            )?,
            vault_name: NonEmptyString::for_field("recovery vault name", vault_name)?,
        })
    }

    /// Returns the resource group of the vault.
    #[must_use]
    pub fn resource_group_name(&self) -> &str {
        self.resource_group_name.as_str()
    }

    /// Returns the vault name.
    #[must_use]
    pub fn vault_name(&self) -> &str {
        self.vault_name.as_str()
    }
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    job: ServiceJob,
}

/// HTTP implementation of the site recovery operation port.
pub struct HttpOperationDispatcher {
    client: HttpManagementClient,
    vault: RecoveryVault,
    api_version: String,
}

impl HttpOperationDispatcher {
    /// Creates a dispatcher bound to one vault.
    #[must_use]
    pub fn new(
        client: HttpManagementClient,
        vault: RecoveryVault,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            vault,
            api_version: api_version.into(),
        }
    }

    fn vault_url(&self, context: &ManagementContext, tail: &[&str]) -> AppResult<Url> {
        let mut segments = vec![
            "subscriptions",
            context.subscription_id(),
            "resourceGroups",
            self.vault.resource_group_name(),
            "providers",
            "Microsoft.SiteRecovery",
            "vaults",
            self.vault.vault_name(),
        ];
        segments.extend_from_slice(tail);

        self.client
            .resource_url(&segments, self.api_version.as_str())
    }
}

#[async_trait]
impl OperationDispatcher for HttpOperationDispatcher {
    async fn create_and_associate_protection_profile(
        &self,
        context: &ManagementContext,
        request: &CreateAndAssociateRequest,
    ) -> AppResult<ServiceJob> {
        let url = self.vault_url(context, &["protectionProfiles", "createAndAssociate"])?;
        let response: JobResponse = self
            .client
            .send_json(context, reqwest::Method::POST, url, request)
            .await?;

        info!(
            job_id = %response.job.id,
            state = %response.job.state,
            topology = request.topology().as_str(),
            profile = request.profile().name(),
            "protection profile association job accepted"
        );

        Ok(response.job)
    }

    async fn get_job(&self, context: &ManagementContext, job_id: &str) -> AppResult<ServiceJob> {
        let url = self.vault_url(context, &["jobs", job_id])?;
        let response: JobResponse = self.client.get_json(context, url).await?;
        Ok(response.job)
    }
}
