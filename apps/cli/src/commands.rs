use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mgmtctl_application::{AuditPolicyService, CancellationFlag, ProtectionProfileService};
use mgmtctl_core::{AppError, AppResult};
use mgmtctl_domain::{
    AssociationTargets, AuditPolicyUpdate, AuditState, CoordinateSource, DatabaseResource,
    ProtectionProfileSpec, StorageAccountSpec,
};
use mgmtctl_infrastructure::{HttpAuditPolicyGateway, HttpManagementClient, HttpOperationDispatcher};
use serde_json::Value;

use crate::cli_config::CliConfig;
use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "mgmtctl")]
#[command(about = "Site recovery and database auditing operations against the management API")]
#[command(version)]
pub struct Cli {
    /// Output format written to stdout
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Protection profile operations
    ProtectionProfile {
        #[command(subcommand)]
        command: ProtectionProfileCommand,
    },
    /// Site recovery job operations
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Database audit policy operations
    AuditPolicy {
        #[command(subcommand)]
        command: AuditPolicyCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProtectionProfileCommand {
    /// Create a protection profile and associate it with protection containers
    Associate(AssociateArgs),
}

#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Show the current state of a job
    Get {
        /// Job identifier
        job_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuditPolicyCommand {
    /// Show the audit policy of a database
    Get(DatabaseArgs),
    /// Change the audit policy of a database
    Set {
        #[command(flatten)]
        database: DatabaseArgs,
        #[command(flatten)]
        settings: AuditSettingsArgs,
    },
}

#[derive(Debug, Args)]
pub struct AssociateArgs {
    /// Protection profile name
    #[arg(long)]
    name: String,
    /// Replication provider, e.g. HyperVReplicaAzure
    #[arg(long, default_value = "HyperVReplicaAzure")]
    replication_provider: String,
    /// Hours between application-consistent snapshots
    #[arg(long, default_value_t = 0)]
    application_consistent_snapshot_frequency_in_hours: u32,
    /// Seconds between replication cycles (30, 300 or 900)
    #[arg(long, default_value_t = 300)]
    replication_frequency_in_seconds: u32,
    /// Time of day initial replication starts, HH:MM[:SS]
    #[arg(long, value_parser = parse_start_time)]
    replication_start_time: Option<NaiveTime>,
    /// Recovery storage account as NAME:SUBSCRIPTION_ID, repeatable
    #[arg(long = "storage-account", value_parser = parse_storage_account)]
    storage_accounts: Vec<StorageAccountSpec>,
    /// Primary protection container identifier
    #[arg(long)]
    primary_container: Option<String>,
    /// Recovery protection container in another enterprise site
    #[arg(long)]
    recovery_container: Option<String>,
    /// Recovery protection container in the cloud
    #[arg(long)]
    recovery_cloud_container: Option<String>,
}

#[derive(Debug, Args)]
pub struct DatabaseArgs {
    /// Resource group of the server
    #[arg(long)]
    resource_group_name: Option<String>,
    /// Server name
    #[arg(long)]
    server_name: Option<String>,
    /// Database name
    #[arg(long)]
    database_name: Option<String>,
    /// JSON database object file, `-` reads stdin; wins over the explicit names
    #[arg(long)]
    database_object: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AuditSettingsArgs {
    /// Auditing state
    #[arg(long, value_enum, ignore_case = true)]
    state: Option<AuditStateArg>,
    /// Blob endpoint receiving audit logs
    #[arg(long)]
    storage_endpoint: Option<String>,
    /// Subscription owning the storage account
    #[arg(long)]
    storage_account_subscription_id: Option<String>,
    /// Days to keep audit logs, 0 keeps them forever
    #[arg(long)]
    retention_in_days: Option<u32>,
    /// Audited action group, repeatable; replaces the current list
    #[arg(long = "audit-action-group")]
    audit_action_groups: Vec<String>,
    /// Send audit logs to Azure Monitor
    #[arg(long)]
    azure_monitor_target: Option<bool>,
    /// Use the storage secondary key
    #[arg(long)]
    use_secondary_key: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuditStateArg {
    /// Log database access
    #[value(name = "Enabled")]
    Enabled,
    /// Stop logging database access
    #[value(name = "Disabled")]
    Disabled,
}

impl From<AuditStateArg> for AuditState {
    fn from(value: AuditStateArg) -> Self {
        match value {
            AuditStateArg::Enabled => Self::Enabled,
            AuditStateArg::Disabled => Self::Disabled,
        }
    }
}

impl AssociateArgs {
    fn into_parts(self) -> (ProtectionProfileSpec, AssociationTargets) {
        (
            ProtectionProfileSpec {
                name: self.name,
                replication_provider: self.replication_provider,
                application_consistent_snapshot_frequency_in_hours: self
                    .application_consistent_snapshot_frequency_in_hours,
                replication_frequency_in_seconds: self.replication_frequency_in_seconds,
                replication_start_time: self.replication_start_time,
                storage_accounts: self.storage_accounts,
            },
            AssociationTargets {
                primary_container: self.primary_container,
                recovery_container: self.recovery_container,
                recovery_cloud_container: self.recovery_cloud_container,
            },
        )
    }
}

impl DatabaseArgs {
    fn into_source(self) -> AppResult<CoordinateSource> {
        let database_object = self
            .database_object
            .map(|path| read_database_object(&path))
            .transpose()?;

        Ok(CoordinateSource {
            resource_group_name: self.resource_group_name,
            server_name: self.server_name,
            database_name: self.database_name,
            database_object,
        })
    }
}

impl AuditSettingsArgs {
    fn into_update(self) -> AuditPolicyUpdate {
        AuditPolicyUpdate {
            state: self.state.map(AuditState::from),
            storage_endpoint: self.storage_endpoint,
            storage_account_subscription_id: self.storage_account_subscription_id,
            retention_days: self.retention_in_days,
            audit_actions_and_groups: (!self.audit_action_groups.is_empty())
                .then_some(self.audit_action_groups),
            is_azure_monitor_target_enabled: self.azure_monitor_target,
            is_storage_secondary_key_in_use: self.use_secondary_key,
        }
    }
}

/// Runs one command and returns the record to print.
pub async fn run(
    command: Command,
    config: &CliConfig,
    cancellation: &CancellationFlag,
) -> AppResult<Value> {
    let client = HttpManagementClient::with_timeout(&config.endpoint, config.request_timeout)?;
    let context = &config.context;

    match command {
        Command::ProtectionProfile {
            command: ProtectionProfileCommand::Associate(args),
        } => {
            let service = protection_profile_service(client, config)?;
            let (spec, targets) = args.into_parts();
            let job = service
                .start_association_job(context, &spec, &targets, cancellation)
                .await?;
            to_output(&job)
        }
        Command::Job {
            command: JobCommand::Get { job_id },
        } => {
            let service = protection_profile_service(client, config)?;
            let job = service.get_job(context, &job_id, cancellation).await?;
            to_output(&job)
        }
        Command::AuditPolicy { command } => {
            let service = AuditPolicyService::new(Arc::new(HttpAuditPolicyGateway::new(
                client,
                config.sql_api_version.as_str(),
            )));

            let policy = match command {
                AuditPolicyCommand::Get(database) => {
                    service
                        .get_database_audit_policy(context, &database.into_source()?, cancellation)
                        .await?
                }
                AuditPolicyCommand::Set { database, settings } => {
                    service
                        .set_database_audit_policy(
                            context,
                            &database.into_source()?,
                            settings.into_update(),
                            cancellation,
                        )
                        .await?
                }
            };
            to_output(&policy)
        }
    }
}

fn protection_profile_service(
    client: HttpManagementClient,
    config: &CliConfig,
) -> AppResult<ProtectionProfileService> {
    let dispatcher = HttpOperationDispatcher::new(
        client,
        config.recovery_vault()?,
        config.site_recovery_api_version.as_str(),
    );

    Ok(ProtectionProfileService::new(Arc::new(dispatcher)))
}

fn to_output<T: serde::Serialize>(record: &T) -> AppResult<Value> {
    serde_json::to_value(record)
        .map_err(|error| AppError::Internal(format!("failed to encode output record: {error}")))
}

fn read_database_object(path: &Path) -> AppResult<DatabaseResource> {
    let raw = if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|error| {
                AppError::Validation(format!("failed to read database object from stdin: {error}"))
            })?;
        raw
    } else {
        std::fs::read_to_string(path).map_err(|error| {
            AppError::Validation(format!(
                "failed to read database object '{}': {error}",
                path.display()
            ))
        })?
    };

    serde_json::from_str::<DatabaseResource>(&raw)
        .map_err(|error| AppError::Validation(format!("invalid database object: {error}")))
}

fn parse_storage_account(value: &str) -> Result<StorageAccountSpec, String> {
    let (name, subscription_id) = value
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:SUBSCRIPTION_ID, got '{value}'"))?;

    Ok(StorageAccountSpec {
        storage_account_name: name.trim().to_owned(),
        subscription_id: subscription_id.trim().to_owned(),
    })
}

fn parse_start_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|error| format!("expected HH:MM[:SS], got '{value}': {error}"))
}
