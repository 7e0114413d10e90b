//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_policy_service;
mod cancellation;
mod job_projector;
mod operation_ports;
mod protection_profile_service;

pub use audit_policy_service::AuditPolicyService;
pub use cancellation::CancellationFlag;
pub use job_projector::project_job;
pub use operation_ports::{AuditPolicyGateway, OperationDispatcher, ServiceJob, ServiceJobError};
pub use protection_profile_service::ProtectionProfileService;
