#[cfg(test)]
mod test_remote;

use super::{EngineError, WorkflowEngine};
use crate::entities::DispatchRequest;
use async_trait::async_trait;
use aws_sdk_sfn::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sfn::operation::start_execution::StartExecutionError;

const TRANSIENT_ERROR_CODES: [&str; 6] = [
    "ThrottlingException",
    "KmsThrottlingException",
    "ServiceUnavailable",
    "ServiceUnavailableException",
    "InternalFailure",
    "RequestTimeout",
];

/// Step Functions backed engine; one execution per job id, named after it.
pub struct SfnEngine {
    client: aws_sdk_sfn::Client,
}

impl SfnEngine {
    pub fn new(client: aws_sdk_sfn::Client) -> Self {
        SfnEngine { client }
    }
}

#[async_trait]
impl WorkflowEngine for SfnEngine {
    async fn start_execution(&self, request: &DispatchRequest) -> Result<String, EngineError> {
        let input = serde_json::to_string(&request.payload).map_err(|e| {
            EngineError::Validation(format!("Failed to serialize execution input:\n{:?}", e))
        })?;
        let result_future = self
            .client
            .start_execution()
            .state_machine_arn(&request.workflow_ref)
            .name(&request.job_id)
            .input(input)
            .send();
        match result_future.await {
            Ok(output) => Ok(output.execution_arn().to_string()),
            Err(SdkError::ServiceError(service_error)) => {
                Err(classify_start_error(service_error.err()))
            }
            Err(SdkError::ConstructionFailure(error)) => Err(EngineError::Validation(format!(
                "Failed to construct start execution request:\n{:?}",
                error
            ))),
            Err(error) => Err(EngineError::Unavailable(format!(
                "State machine start call failed. Perhaps state machine service down or busy.\n{:?}",
                error
            ))),
        }
    }
}

pub fn classify_start_error(error: &StartExecutionError) -> EngineError {
    match error {
        StartExecutionError::ExecutionAlreadyExists(_) => EngineError::AlreadyExists,
        StartExecutionError::ExecutionLimitExceeded(_) => EngineError::Unavailable(format!(
            "Execution limit exceeded.\n{:?}",
            error
        )),
        StartExecutionError::InvalidArn(_)
        | StartExecutionError::InvalidExecutionInput(_)
        | StartExecutionError::InvalidName(_)
        | StartExecutionError::StateMachineDeleting(_)
        | StartExecutionError::StateMachineDoesNotExist(_)
        | StartExecutionError::ValidationException(_) => {
            EngineError::Validation(format!("{:?}", error))
        }
        other => match other.code() {
            Some(code) if TRANSIENT_ERROR_CODES.contains(&code) => {
                EngineError::Unavailable(format!("{:?}", other))
            }
            _ => EngineError::Validation(format!("{:?}", other)),
        },
    }
}
