//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_audit_policy_gateway;
mod http_management_client;
mod http_operation_dispatcher;

#[cfg(test)]
mod stub_endpoint;

pub use http_audit_policy_gateway::HttpAuditPolicyGateway;
pub use http_management_client::HttpManagementClient;
pub use http_operation_dispatcher::{HttpOperationDispatcher, RecoveryVault};
