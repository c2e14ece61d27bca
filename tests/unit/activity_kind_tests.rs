//! Unit tests for activity decoding and kind classification.

use jules_relay::models::{Activity, ActivityKind};
use serde_json::json;

#[test]
fn session_completed_is_terminal() {
    let activity: Activity = serde_json::from_value(json!({
        "name": "sessions/1/activities/9",
        "id": "9",
        "originator": "agent",
        "sessionCompleted": {}
    }))
    .expect("activity decodes");

    assert_eq!(activity.kind, ActivityKind::SessionCompleted);
    assert!(activity.is_terminal());
    assert_eq!(activity.id, "9");
    assert_eq!(activity.originator.as_deref(), Some("agent"));
}

#[test]
fn progress_update_exposes_title() {
    let activity = Activity::from(json!({
        "id": "2",
        "createTime": "2025-01-01T00:00:00Z",
        "progressUpdated": { "title": "Running tests", "description": "cargo test" }
    }));

    assert!(!activity.is_terminal());
    assert_eq!(activity.progress_title(), Some("Running tests"));
    assert_eq!(
        activity.kind,
        ActivityKind::ProgressUpdated {
            title: "Running tests".into(),
            description: Some("cargo test".into()),
        }
    );
    assert_eq!(activity.create_time.as_deref(), Some("2025-01-01T00:00:00Z"));
}

#[test]
fn progress_without_title_has_empty_title() {
    let kind = ActivityKind::classify(&json!({ "progressUpdated": {} }));
    assert_eq!(
        kind,
        ActivityKind::ProgressUpdated {
            title: String::new(),
            description: None,
        }
    );
}

#[test]
fn unknown_kind_is_other_and_not_terminal() {
    let kind = ActivityKind::classify(&json!({
        "id": "3",
        "description": "plan ready",
        "planGenerated": { "plan": { "steps": [] } }
    }));

    assert_eq!(
        kind,
        ActivityKind::Other {
            kind: Some("planGenerated".into())
        }
    );
    assert!(!kind.is_terminal());
    assert_eq!(kind.label(), "planGenerated");
}

#[test]
fn record_with_only_metadata_has_no_kind() {
    let kind = ActivityKind::classify(&json!({ "id": "4", "name": "x" }));
    assert_eq!(kind, ActivityKind::Other { kind: None });
    assert_eq!(kind.label(), "unknown");
}

#[test]
fn non_object_payload_is_other() {
    let activity = Activity::from(json!("garbage"));
    assert_eq!(activity.kind, ActivityKind::Other { kind: None });
    assert!(activity.id.is_empty());
}

#[test]
fn completion_takes_precedence_over_progress_in_same_record() {
    let kind = ActivityKind::classify(&json!({
        "progressUpdated": { "title": "wrapping up" },
        "sessionCompleted": {}
    }));
    assert!(kind.is_terminal());
}

#[test]
fn activity_serialises_back_to_received_json() {
    let raw = json!({
        "id": "5",
        "agentMessaged": { "agentMessage": "hello" },
        "artifacts": [{ "bashOutput": { "command": "ls" } }]
    });
    let activity = Activity::from(raw.clone());
    assert_eq!(serde_json::to_value(&activity).expect("serialise"), raw);
    assert_eq!(activity.raw(), &raw);
}
