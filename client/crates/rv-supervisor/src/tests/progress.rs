use crate::{Notice, ProgressEvent, Stage};

#[test]
fn test_stage_percentages() {
    let percents: Vec<u8> = [
        Stage::Checking,
        Stage::Starting,
        Stage::WaitingHealthy,
        Stage::Initializing,
        Stage::Done,
    ]
    .into_iter()
    .map(Stage::percent)
    .collect();

    assert_eq!(percents, vec![0, 20, 40, 70, 100]);
}

#[test]
fn test_progress_event_from_stage() {
    let event = ProgressEvent::from(Stage::Initializing);

    assert_eq!(event.stage, Stage::Initializing);
    assert_eq!(event.percent, 70);
    assert_eq!(event.message, "Initializing server...");
}

#[test]
fn test_notice_serializes_with_kind_tag() {
    let notice = Notice::Error {
        message: "Backend not reachable after 100 seconds".into(),
        hint: "Try restarting".into(),
    };

    let json = serde_json::to_value(&notice).unwrap();

    assert_eq!(json["kind"], "error");
    assert_eq!(json["hint"], "Try restarting");
    assert!(notice.is_error());
    assert!(!Notice::info("ready").is_error());
}
