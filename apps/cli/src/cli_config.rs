use std::env;
use std::time::Duration;

use mgmtctl_core::{AppError, AppResult, ManagementContext};
use mgmtctl_infrastructure::RecoveryVault;
use tracing_subscriber::EnvFilter;

const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
const DEFAULT_SITE_RECOVERY_API_VERSION: &str = "2015-01-01";
const DEFAULT_SQL_API_VERSION: &str = "2021-11-01";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub endpoint: String,
    pub context: ManagementContext,
    pub request_timeout: Duration,
    pub recovery_vault: Option<RecoveryVault>,
    pub site_recovery_api_version: String,
    pub sql_api_version: String,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let endpoint = non_empty("MGMTCTL_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let subscription_id = non_empty("MGMTCTL_SUBSCRIPTION_ID").ok_or_else(|| {
            AppError::Validation("MGMTCTL_SUBSCRIPTION_ID is required".to_owned())
        })?;
        let access_token = non_empty("MGMTCTL_ACCESS_TOKEN")
            .ok_or_else(|| AppError::Validation("MGMTCTL_ACCESS_TOKEN is required".to_owned()))?;

        let request_timeout_secs = match non_empty("MGMTCTL_REQUEST_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid MGMTCTL_REQUEST_TIMEOUT_SECS value '{value}': {error}"
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };
        if request_timeout_secs == 0 {
            return Err(AppError::Validation(
                "MGMTCTL_REQUEST_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        let recovery_vault = match (
            non_empty("MGMTCTL_RECOVERY_VAULT_RESOURCE_GROUP"),
            non_empty("MGMTCTL_RECOVERY_VAULT_NAME"),
        ) {
            (Some(resource_group), Some(vault_name)) => {
                Some(RecoveryVault::new(resource_group, vault_name)?)
            }
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "MGMTCTL_RECOVERY_VAULT_RESOURCE_GROUP and MGMTCTL_RECOVERY_VAULT_NAME must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            endpoint,
            context: ManagementContext::new(subscription_id, access_token)?,
            request_timeout: Duration::from_secs(request_timeout_secs),
            recovery_vault,
            site_recovery_api_version: non_empty("MGMTCTL_SITE_RECOVERY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SITE_RECOVERY_API_VERSION.to_owned()),
            sql_api_version: non_empty("MGMTCTL_SQL_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SQL_API_VERSION.to_owned()),
        })
    }

    pub fn recovery_vault(&self) -> AppResult<RecoveryVault> {
        self.recovery_vault.clone().ok_or_else(|| {
            AppError::Validation(
                "MGMTCTL_RECOVERY_VAULT_RESOURCE_GROUP and MGMTCTL_RECOVERY_VAULT_NAME are required for site recovery commands"
                    .to_owned(),
            )
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::CliConfig;

    fn lookup(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = CliConfig::from_lookup(lookup(&[
            ("MGMTCTL_SUBSCRIPTION_ID", "sub-123"),
            ("MGMTCTL_ACCESS_TOKEN", "token"),
        ]));

        let Ok(config) = config else {
            panic!("config should load");
        };
        assert_eq!(config.endpoint, "https://management.azure.com");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.context.subscription_id(), "sub-123");
        assert!(config.recovery_vault.is_none());
        assert!(config.recovery_vault().is_err());
    }

    #[test]
    fn requires_credentials() {
        let config = CliConfig::from_lookup(lookup(&[("MGMTCTL_SUBSCRIPTION_ID", "sub-123")]));
        assert!(config.is_err());
    }

    #[test]
    fn rejects_zero_timeout_and_half_configured_vault() {
        let zero_timeout = CliConfig::from_lookup(lookup(&[
            ("MGMTCTL_SUBSCRIPTION_ID", "sub-123"),
            ("MGMTCTL_ACCESS_TOKEN", "token"),
            ("MGMTCTL_REQUEST_TIMEOUT_SECS", "0"),
        ]));
        assert!(zero_timeout.is_err());

        let half_vault = CliConfig::from_lookup(lookup(&[
            ("MGMTCTL_SUBSCRIPTION_ID", "sub-123"),
            ("MGMTCTL_ACCESS_TOKEN", "token"),
            ("MGMTCTL_RECOVERY_VAULT_NAME", "vault-1"),
        ]));
        assert!(half_vault.is_err());
    }

    #[test]
    fn reads_vault_and_trims_endpoint() {
        let config = CliConfig::from_lookup(lookup(&[
            ("MGMTCTL_ENDPOINT", "http://127.0.0.1:8080/"),
            ("MGMTCTL_SUBSCRIPTION_ID", "sub-123"),
            ("MGMTCTL_ACCESS_TOKEN", "token"),
            ("MGMTCTL_RECOVERY_VAULT_RESOURCE_GROUP", "rg-recovery"),
            ("MGMTCTL_RECOVERY_VAULT_NAME", "vault-1"),
        ]));

        let Ok(config) = config else {
            panic!("config should load");
        };
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
        assert_eq!(
            config.recovery_vault().map(|vault| vault.vault_name().to_owned()).ok(),
            Some("vault-1".to_owned())
        );
    }
}
