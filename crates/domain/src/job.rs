use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a remotely owned job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    /// Accepted but not started.
    Pending,
    /// In progress.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Stopped before completion.
    Cancelled,
    /// State introduced by the service after this client was built.
    Other(String),
}

impl JobState {
    /// Returns the state value exactly as the service reported it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns whether the job will not change state anymore.
    ///
    /// Unknown states are treated as non-terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<JobState> for String {
    fn from(value: JobState) -> Self {
        match value {
            JobState::Other(value) => value,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Job timestamp, parsed when the service sent RFC 3339 and kept verbatim otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobTimestamp {
    /// Timestamp normalised to UTC.
    Utc(DateTime<Utc>),
    /// Value the service sent that is not an RFC 3339 timestamp, such as an
    /// offsetless sentinel.
    Raw(String),
}

impl JobTimestamp {
    /// Returns the timestamp in UTC when it could be parsed.
    #[must_use]
    pub fn as_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Utc(value) => Some(*value),
            Self::Raw(_) => None,
        }
    }
}

impl From<String> for JobTimestamp {
    fn from(value: String) -> Self {
        match DateTime::parse_from_rfc3339(&value) {
            Ok(parsed) => Self::Utc(parsed.with_timezone(&Utc)),
            Err(_) => Self::Raw(value),
        }
    }
}

/// Error reported by the service for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobError {
    /// Service error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Service properties whose names collide with the fields above.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub shadowed_properties: Map<String, Value>,
    /// Remaining error properties.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

impl JobError {
    /// Keys this record writes itself.
    pub const OUTPUT_FIELDS: [&'static str; 3] = ["errorCode", "message", "shadowedProperties"];
}

/// Stable output record for a remotely owned job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Service-assigned job identifier.
    pub id: String,
    /// Display name of the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current state.
    pub status: JobState,
    /// Service description of the current state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_description: Option<String>,
    /// Start timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<JobTimestamp>,
    /// End timestamp, absent while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<JobTimestamp>,
    /// Identifier of the resource the job acts on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_object_id: Option<String>,
    /// Name of the resource the job acts on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_object_name: Option<String>,
    /// Actions the service allows on the job.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_actions: Vec<String>,
    /// Errors reported for the job.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JobError>,
    /// Service properties whose names collide with the fields above.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub shadowed_properties: Map<String, Value>,
    /// Fields this client does not model, kept verbatim.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

impl Job {
    /// Keys this record writes itself.
    pub const OUTPUT_FIELDS: [&'static str; 11] = [
        "id",
        "name",
        "status",
        "stateDescription",
        "startTime",
        "endTime",
        "targetObjectId",
        "targetObjectName",
        "allowedActions",
        "errors",
        "shadowedProperties",
    ];
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{JobState, JobTimestamp};

    #[test]
    fn rfc3339_timestamp_is_normalised_to_utc() {
        let timestamp = JobTimestamp::from("2024-05-01T12:00:00+02:00".to_owned());
        assert_eq!(
            timestamp.as_utc(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single()
        );
    }

    #[test]
    fn offsetless_timestamp_is_kept_verbatim() {
        let timestamp = JobTimestamp::from("0001-01-01T00:00:00".to_owned());
        assert_eq!(timestamp, JobTimestamp::Raw("0001-01-01T00:00:00".to_owned()));
        assert_eq!(
            serde_json::to_value(&timestamp).unwrap_or_default(),
            "0001-01-01T00:00:00"
        );
    }

    #[test]
    fn known_states_round_trip_through_wire_value() {
        for state in ["Pending", "Running", "Succeeded", "Failed", "Cancelled"] {
            assert_eq!(JobState::from(state.to_owned()).as_str(), state);
        }
    }

    #[test]
    fn unknown_state_is_kept_verbatim_and_not_terminal() {
        let state = JobState::from("Suspended".to_owned());
        assert_eq!(state, JobState::Other("Suspended".to_owned()));
        assert_eq!(state.to_string(), "Suspended");
        assert!(!state.is_terminal());
    }

    #[test]
    fn finished_states_are_terminal() {
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Pending.is_terminal());
    }
}
