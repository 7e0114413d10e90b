use mgmtctl_domain::{Job, JobError, JobState, JobTimestamp};
use serde_json::{Map, Value};

use crate::operation_ports::{ServiceJob, ServiceJobError};

/// Maps a service job into the stable output record.
///
/// Every field is carried over. Unknown states and unmodelled properties pass
/// through unchanged. Unmodelled properties named like an output field are
/// moved under `shadowedProperties` so they cannot overwrite it.
#[must_use]
pub fn project_job(job: ServiceJob) -> Job {
    let ServiceJob {
        id,
        name,
        state,
        state_description,
        start_time,
        end_time,
        target_object_id,
        target_object_name,
        allowed_actions,
        errors,
        additional_properties,
    } = job;
    let (shadowed_properties, additional_properties) =
        split_shadowed(additional_properties, &Job::OUTPUT_FIELDS);

    Job {
        id,
        name,
        status: JobState::from(state),
        state_description,
        start_time: start_time.map(JobTimestamp::from),
        end_time: end_time.map(JobTimestamp::from),
        target_object_id,
        target_object_name,
        allowed_actions,
        errors: errors.into_iter().map(project_error).collect(),
        shadowed_properties,
        additional_properties,
    }
}

fn project_error(error: ServiceJobError) -> JobError {
    let (shadowed_properties, additional_properties) =
        split_shadowed(error.additional_properties, &JobError::OUTPUT_FIELDS);

    JobError {
        error_code: error.code,
        message: error.message,
        shadowed_properties,
        additional_properties,
    }
}

fn split_shadowed(
    properties: Map<String, Value>,
    output_fields: &[&str],
) -> (Map<String, Value>, Map<String, Value>) {
    properties
        .into_iter()
        .partition(|(key, _)| output_fields.contains(&key.as_str()))
}
