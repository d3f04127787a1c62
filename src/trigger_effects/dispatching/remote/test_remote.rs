use super::*;
use aws_sdk_sfn::error::ErrorMetadata;
use aws_sdk_sfn::types::error::{
    ExecutionAlreadyExists, ExecutionLimitExceeded, InvalidName, StateMachineDoesNotExist,
};

fn generic_error(code: &str) -> StartExecutionError {
    StartExecutionError::generic(ErrorMetadata::builder().code(code).message("boom").build())
}

#[test]
fn classify_start_error_test_already_exists() {
    let error = StartExecutionError::ExecutionAlreadyExists(
        ExecutionAlreadyExists::builder()
            .message("Execution Already Exists")
            .build(),
    );
    assert_eq!(classify_start_error(&error), EngineError::AlreadyExists);
}

#[test]
fn classify_start_error_test_limit_exceeded_is_transient() {
    let error = StartExecutionError::ExecutionLimitExceeded(
        ExecutionLimitExceeded::builder().message("too many").build(),
    );
    assert!(matches!(
        classify_start_error(&error),
        EngineError::Unavailable(_)
    ));
}

#[test]
fn classify_start_error_test_invalid_input_is_permanent() {
    let bad_name = StartExecutionError::InvalidName(InvalidName::builder().build());
    let missing = StartExecutionError::StateMachineDoesNotExist(
        StateMachineDoesNotExist::builder().build(),
    );
    assert!(matches!(
        classify_start_error(&bad_name),
        EngineError::Validation(_)
    ));
    assert!(matches!(
        classify_start_error(&missing),
        EngineError::Validation(_)
    ));
}

#[test]
fn classify_start_error_test_throttling_is_transient() {
    for code in TRANSIENT_ERROR_CODES {
        assert!(
            matches!(
                classify_start_error(&generic_error(code)),
                EngineError::Unavailable(_)
            ),
            "code {}",
            code
        );
    }
}

#[test]
fn classify_start_error_test_unknown_code_is_permanent() {
    assert!(matches!(
        classify_start_error(&generic_error("AccessDeniedException")),
        EngineError::Validation(_)
    ));
}
