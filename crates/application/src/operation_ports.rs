mod audit_gateway;
mod dispatcher;
mod service_job;

pub use audit_gateway::AuditPolicyGateway;
pub use dispatcher::OperationDispatcher;
pub use service_job::{ServiceJob, ServiceJobError};
