use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Created,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNotification {
    pub bucket: String,
    pub key: String,
    pub event_time: OffsetDateTime,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRule {
    pub prefix: String,
    pub suffix: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPayload {
    pub bucket: String,
    pub key: String,
    pub event_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub job_id: String,
    pub payload: DispatchPayload,
    pub workflow_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Started { execution_ref: String },
    AlreadyRunning,
    EngineUnavailable(String),
    Rejected(String),
}

/// Summary of one invocation, returned to the Lambda runtime.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub received: usize,
    pub malformed: usize,
    pub filtered_out: usize,
    pub started: usize,
    pub already_running: usize,
    pub rejected: Vec<String>,
}
