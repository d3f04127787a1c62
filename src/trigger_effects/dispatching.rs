pub mod remote;

use crate::entities::{DispatchOutcome, DispatchPayload, DispatchRequest, ObjectNotification};
use async_trait::async_trait;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tokio::time::timeout;
use tracing::{event, Level};
use uuid::{uuid, Uuid};

/// Namespace for job identifiers. Changing it changes every identifier and
/// defeats deduplication of in-flight executions.
const JOB_ID_NAMESPACE: Uuid = uuid!("5b1f0c1e-8a4e-4f7a-9d51-3c2b7e6a90d4");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    AlreadyExists,
    Validation(String),
    Unavailable(String),
}

#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Starts an execution named after the request's job id and returns the
    /// engine's reference to it.
    async fn start_execution(&self, request: &DispatchRequest) -> Result<String, EngineError>;
}

/// Stable identifier for the object at `bucket`/`key`.
///
/// The bucket is length-prefixed so no `/` placement can make two pairs
/// encode alike. The result is a UUID v5 rendered as 36 characters.
pub fn job_identifier(bucket: &str, key: &str) -> String {
    let location = format!("{}:{}/{}", bucket.len(), bucket, key);
    Uuid::new_v5(&JOB_ID_NAMESPACE, location.as_bytes())
        .hyphenated()
        .to_string()
}

pub struct Dispatcher<E: WorkflowEngine> {
    engine: E,
    workflow_ref: String,
    start_timeout: Duration,
}

impl<E: WorkflowEngine> Dispatcher<E> {
    pub fn new(engine: E, workflow_ref: &str, start_timeout: Duration) -> Self {
        Dispatcher {
            engine,
            workflow_ref: workflow_ref.to_string(),
            start_timeout,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn build_request(&self, notification: &ObjectNotification) -> DispatchRequest {
        // Rfc3339 only fails for years outside 0..=9999
        let event_time = notification
            .event_time
            .format(&Rfc3339)
            .unwrap_or_else(|_| notification.event_time.to_string());
        DispatchRequest {
            job_id: job_identifier(&notification.bucket, &notification.key),
            payload: DispatchPayload {
                bucket: notification.bucket.clone(),
                key: notification.key.clone(),
                event_time,
            },
            workflow_ref: self.workflow_ref.clone(),
        }
    }

    /// Issues exactly one start call for the notification.
    pub async fn dispatch(&self, notification: &ObjectNotification) -> DispatchOutcome {
        self.dispatch_within(notification, self.start_timeout).await
    }

    /// Like [`Dispatcher::dispatch`], but gives up after `limit` when that is
    /// shorter than the configured start timeout.
    pub async fn dispatch_within(
        &self,
        notification: &ObjectNotification,
        limit: Duration,
    ) -> DispatchOutcome {
        let request = self.build_request(notification);
        let call_timeout = self.start_timeout.min(limit);
        let outcome = match timeout(call_timeout, self.engine.start_execution(&request)).await {
            Ok(Ok(execution_ref)) => DispatchOutcome::Started { execution_ref },
            Ok(Err(EngineError::AlreadyExists)) => DispatchOutcome::AlreadyRunning,
            Ok(Err(EngineError::Unavailable(reason))) => DispatchOutcome::EngineUnavailable(reason),
            Ok(Err(EngineError::Validation(reason))) => DispatchOutcome::Rejected(reason),
            Err(_) => DispatchOutcome::EngineUnavailable(format!(
                "Start execution call exceeded {} ms.",
                call_timeout.as_millis()
            )),
        };
        event!(
            Level::DEBUG,
            job_id = %request.job_id,
            bucket = %request.payload.bucket,
            key = %request.payload.key,
            "dispatch attempt finished: {:?}",
            &outcome
        );
        outcome
    }
}
