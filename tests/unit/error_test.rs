//! Tests for error types

use techwm_scheduler::core::{ErrorKind, WorkloadError};

#[test]
fn test_resource_not_found_error() {
    let err = WorkloadError::ResourceNotFound("gpu-7".to_string());
    assert_eq!(format!("{}", err), "resource not found: gpu-7");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_policy_violation_error() {
    let err = WorkloadError::PolicyViolation("3 resources requested, at most 2 allowed".into());
    assert_eq!(
        format!("{}", err),
        "resource request illegal: 3 resources requested, at most 2 allowed"
    );
    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
}

#[test]
fn test_cancelled_error() {
    let err = WorkloadError::Cancelled(12);
    assert_eq!(format!("{}", err), "job 12 was cancelled");
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_backend_error() {
    let err = WorkloadError::Backend("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend error: connection failed");
    assert_eq!(err.kind(), ErrorKind::BackendFailure);
}

#[test]
fn test_already_exists_error() {
    let err = WorkloadError::AlreadyExists("cpu-0".into());
    assert_eq!(format!("{}", err), "already exists: cpu-0");
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}
