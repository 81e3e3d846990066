use crate::{FailureKind, SupervisorError};

#[test]
fn test_failure_kinds() {
    let spawn = SupervisorError::spawn(
        "/missing/python",
        std::io::Error::from(std::io::ErrorKind::NotFound),
    );

    assert_eq!(spawn.kind(), FailureKind::Spawn);
    assert_eq!(
        SupervisorError::exited_before_healthy(Some(1)).kind(),
        FailureKind::Spawn
    );
    assert_eq!(
        SupervisorError::health_timeout(100_000).kind(),
        FailureKind::HealthTimeout
    );
    assert_eq!(
        SupervisorError::initialize(Some(500), "boom").kind(),
        FailureKind::Init
    );
    assert_eq!(
        SupervisorError::missing_project_root().kind(),
        FailureKind::Init
    );
    assert_eq!(
        SupervisorError::process_crashed(Some(9)).kind(),
        FailureKind::ProcessCrash
    );
    assert_eq!(SupervisorError::cancelled().kind(), FailureKind::Other);
}

#[test]
fn test_summary_omits_location() {
    let err = SupervisorError::initialize(Some(400), "Project root does not exist");

    assert_eq!(
        err.summary(),
        "Initialization failed: Project root does not exist"
    );
    assert!(err.to_string().contains("Project root does not exist"));
}

#[test]
fn test_health_timeout_summary_in_seconds() {
    let err = SupervisorError::health_timeout(100_000);

    assert_eq!(err.summary(), "Backend not reachable after 100 seconds");
}

#[test]
fn test_every_failure_has_recovery_hint() {
    let errors = [
        SupervisorError::exited_before_healthy(None),
        SupervisorError::health_timeout(1000),
        SupervisorError::initialize(None, "x"),
        SupervisorError::process_crashed(None),
    ];

    for err in errors {
        assert!(!err.recovery_hint().is_empty());
    }
}
