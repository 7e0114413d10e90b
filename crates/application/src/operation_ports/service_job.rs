use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Job representation exactly as returned by the management endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceJob {
    /// Service-assigned job identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Raw state value.
    pub state: String,
    /// Raw state description.
    #[serde(default)]
    pub state_description: Option<String>,
    /// Start timestamp as sent.
    #[serde(default)]
    pub start_time: Option<String>,
    /// End timestamp as sent.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Target resource identifier.
    #[serde(default)]
    pub target_object_id: Option<String>,
    /// Target resource name.
    #[serde(default)]
    pub target_object_name: Option<String>,
    /// Allowed actions.
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    /// Reported errors.
    #[serde(default)]
    pub errors: Vec<ServiceJobError>,
    /// Every other field the service sent.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

/// Job error as returned by the management endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceJobError {
    /// Service error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Every other error property.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}
