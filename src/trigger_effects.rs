pub mod dispatching;
pub mod filtering;
mod retrying;

use crate::config::RetryPolicy;
use crate::entities::{DispatchOutcome, DispatchReport, FilterRule, ObjectNotification};
use crate::events::EventProcessingError;
use dispatching::{Dispatcher, WorkflowEngine};
use filtering::accepts;
use lambda_runtime::Error;
use retrying::dispatch_until_settled;
use simple_error::simple_error;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{event, Level};

pub async fn generate_trigger_effects<E: WorkflowEngine>(
    notifications: Vec<Result<ObjectNotification, EventProcessingError>>,
    rule: &FilterRule,
    dispatcher: &Dispatcher<E>,
    retry_policy: &RetryPolicy,
    budget: Duration,
) -> Result<DispatchReport, Error> {
    let deadline = Instant::now() + budget;
    let mut report = DispatchReport {
        received: notifications.len(),
        ..DispatchReport::default()
    };
    let mut error_strings = vec![];
    for maybe_notification in notifications {
        let notification = match maybe_notification
            .and_then(|n| accepts(&n, rule).map(|passes| (n, passes)))
        {
            Ok((notification, true)) => notification,
            Ok((notification, false)) => {
                event!(
                    Level::INFO,
                    "Skipping {}/{}: not an object creation matching prefix {:?} and suffix {:?}.",
                    &notification.bucket,
                    &notification.key,
                    &rule.prefix,
                    &rule.suffix
                );
                report.filtered_out += 1;
                continue;
            }
            Err(error) => {
                event!(Level::ERROR, "Dropping malformed notification: {:?}", error);
                report.malformed += 1;
                continue;
            }
        };
        let request = dispatcher.build_request(&notification);
        let notification_ref = &notification;
        let attempt_fn = move |limit: Duration| dispatcher.dispatch_within(notification_ref, limit);
        let (outcome, attempts) =
            dispatch_until_settled(attempt_fn, retry_policy, deadline).await;
        match outcome {
            DispatchOutcome::Started { execution_ref } => {
                event!(
                    Level::INFO,
                    job_id = %request.job_id,
                    "Execution {} is running for {}/{} (a redelivery with identical input reports the same execution).",
                    execution_ref,
                    &notification.bucket,
                    &notification.key
                );
                report.started += 1;
            }
            DispatchOutcome::AlreadyRunning => {
                event!(
                    Level::INFO,
                    job_id = %request.job_id,
                    "Execution for {}/{} already exists; treating duplicate notification as done.",
                    &notification.bucket,
                    &notification.key
                );
                report.already_running += 1;
            }
            DispatchOutcome::Rejected(reason) => {
                // permanent: surfaced for an operator, never retried
                event!(
                    Level::ERROR,
                    job_id = %request.job_id,
                    "Workflow engine rejected execution for {}/{}: {}",
                    &notification.bucket,
                    &notification.key,
                    reason
                );
                report.rejected.push(request.job_id);
            }
            DispatchOutcome::EngineUnavailable(reason) => {
                event!(
                    Level::ERROR,
                    job_id = %request.job_id,
                    "ALERT: workflow engine still unavailable after {} attempts for {}/{}: {}",
                    attempts,
                    &notification.bucket,
                    &notification.key,
                    reason
                );
                error_strings.push(format!(
                    "{}/{} ({}): {}",
                    &notification.bucket, &notification.key, &request.job_id, reason
                ));
            }
        }
    }
    event!(Level::INFO, "Invocation summary: {:?}", &report);
    if !error_strings.is_empty() {
        Err(Box::new(simple_error!(format!(
            "Not all qualifying uploads were dispatched.\n{:?}",
            error_strings
        ))))
    } else {
        Ok(report)
    }
}
