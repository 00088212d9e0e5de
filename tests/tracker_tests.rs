use scenario_sync::tracker::jira::{parse_issue, parse_linked_keys, parse_linked_test};
use scenario_sync::tracker::{
    InMemoryTracker, JiraClient, JiraConfig, NewTest, STEPS_HEADING, Tracker, TrackerError,
    test_description,
};
use serde_json::json;

use crate::common::fixtures::{ISSUE_KEY, PROJECT, issue};

mod common;

// ============================================================================
// Errors and configuration
// ============================================================================

#[test]
fn retryable_errors() {
    assert!(TrackerError::Transport("reset".into()).is_retryable());
    for status in [429, 500, 502, 503, 504] {
        assert!(TrackerError::Http { status, body: String::new() }.is_retryable());
    }
    for status in [400, 401, 403, 404] {
        assert!(!TrackerError::Http { status, body: String::new() }.is_retryable());
    }
    assert!(!TrackerError::NotFound("X-1".into()).is_retryable());
    assert!(!TrackerError::Config("x".into()).is_retryable());
}

fn jira_config() -> JiraConfig {
    JiraConfig {
        base_url: Some("https://example.atlassian.net/".to_string()),
        email: Some("qa@example.com".to_string()),
        token: Some("secret-token".to_string()),
        ..JiraConfig::default()
    }
}

#[test]
fn client_requires_credentials() {
    let mut config = jira_config();
    config.token = None;
    assert!(matches!(JiraClient::new(&config), Err(TrackerError::Config(_))));

    let mut config = jira_config();
    config.base_url = Some("   ".to_string());
    assert!(matches!(JiraClient::new(&config), Err(TrackerError::Config(_))));
}

#[test]
fn client_trims_base_url() {
    let client = JiraClient::new(&jira_config()).unwrap();
    assert_eq!(client.base_url(), "https://example.atlassian.net");
}

#[test]
fn config_debug_redacts_token() {
    let printed = format!("{:?}", jira_config());
    assert!(!printed.contains("secret-token"));
    assert!(printed.contains("<redacted>"));
}

#[test]
fn config_defaults() {
    let config = JiraConfig::default();
    assert_eq!(config.relates_link_type, "Relates");
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.backoff_ms, 600);
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn unreachable_site_is_transport_error() {
    let config = JiraConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        max_retries: 1,
        backoff_ms: 0,
        timeout_secs: 2,
        ..jira_config()
    };
    let client = JiraClient::new(&config).unwrap();
    let err = client.get_issue("PROJ-1").unwrap_err();
    assert!(matches!(err, TrackerError::Transport(_)));
}

// ============================================================================
// Response parsing
// ============================================================================

#[test]
fn parse_issue_with_rich_text() {
    let data = json!({
        "key": "PROJ-7",
        "fields": {
            "summary": "Login page",
            "labels": ["frontend", "web"],
            "description": {
                "type": "doc", "version": 1,
                "content": [{"type": "paragraph", "content": [{"type": "text", "text": "As a user"}]}]
            },
            "comment": {"comments": [
                {"author": {"displayName": "Ana"}, "body": {"type": "doc", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "Use SSO too"}]}
                ]}},
                {"body": "plain body"}
            ]}
        }
    });

    let issue = parse_issue("PROJ-7", &data);
    assert_eq!(issue.summary, "Login page");
    assert_eq!(issue.description_text, "As a user");
    assert!(issue.description.is_some());
    assert_eq!(issue.labels, vec!["frontend", "web"]);
    assert_eq!(issue.comments.len(), 2);
    assert_eq!(issue.comments[0].author, "Ana");
    assert_eq!(issue.comments[0].body, "Use SSO too");
    assert_eq!(issue.comments[1].author, "Unknown");
    assert_eq!(issue.comments[1].body, "plain body");
    assert_eq!(
        issue.comments_text(),
        "Comment from Ana:\nUse SSO too\n\n---\n\nComment from Unknown:\nplain body"
    );
}

#[test]
fn parse_issue_missing_fields() {
    let issue = parse_issue("PROJ-8", &json!({}));
    assert_eq!(issue.key, "PROJ-8");
    assert_eq!(issue.summary, "");
    assert_eq!(issue.description_text, "");
    assert!(issue.description.is_none());
    assert!(issue.comments.is_empty());
}

#[test]
fn parse_linked_keys_both_directions() {
    let data = json!({"fields": {"issuelinks": [
        {"outwardIssue": {"key": "QA-1"}},
        {"inwardIssue": {"key": "QA-2"}},
        {"type": {"name": "Blocks"}}
    ]}});
    assert_eq!(parse_linked_keys(&data), vec!["QA-1", "QA-2"]);
    assert!(parse_linked_keys(&json!({"fields": {}})).is_empty());
}

#[test]
fn parse_linked_test_reads_feature() {
    let description = test_description("Scenario: x\n  Given a", "");
    let hit = json!({
        "key": "QA-5",
        "fields": {
            "summary": "PROJ-1 | TC01 | Validate x",
            "created": "2024-03-01T10:00:00.000+0000",
            "description": description,
        }
    });

    let test = parse_linked_test(&hit).unwrap();
    assert_eq!(test.key, "QA-5");
    assert_eq!(test.created, "2024-03-01T10:00:00.000+0000");
    assert_eq!(test.feature_text(), "Scenario: x\n  Given a");

    assert!(parse_linked_test(&json!({"fields": {}})).is_none());
}

#[test]
fn test_description_prefers_feature() {
    let with_feature = test_description("Given a", "fallback");
    assert_eq!(with_feature.content[0].content[0].text.as_deref(), Some(STEPS_HEADING));
    assert_eq!(with_feature.content[1].kind, "codeBlock");

    let plain = test_description("", "fallback");
    assert_eq!(plain.content[0].content[0].text.as_deref(), Some("fallback"));
}

// ============================================================================
// In-memory tracker
// ============================================================================

fn new_test(summary: &str) -> NewTest {
    NewTest {
        project: PROJECT.to_string(),
        summary: summary.to_string(),
        description_text: String::new(),
        feature_text: "Scenario: a\n  Given a".to_string(),
        labels: vec!["mcp".to_string()],
    }
}

#[test]
fn memory_tracker_create_link_and_list() {
    let tracker = InMemoryTracker::new().with_issue(issue());

    let first = tracker.create_test(&new_test("TEST-1 | TC01 | Validate a")).unwrap();
    let second = tracker.create_test(&new_test("TEST-1 | TC02 | Validate b")).unwrap();
    assert_eq!(first, "QA-100");
    assert_eq!(second, "QA-101");

    // unlinked tests are not listed
    assert!(tracker.linked_tests(ISSUE_KEY, PROJECT).unwrap().is_empty());

    tracker.link(&first, ISSUE_KEY, "Tests").unwrap();
    let linked = tracker.linked_tests(ISSUE_KEY, PROJECT).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].key, "QA-100");
    assert_eq!(linked[0].feature_text(), "Scenario: a\n  Given a");

    let created_first = tracker.test(&first).unwrap().created;
    let created_second = tracker.test(&second).unwrap().created;
    assert!(created_first < created_second);
}

#[test]
fn memory_tracker_filters_by_project() {
    let tracker = InMemoryTracker::new();
    tracker.seed_test(ISSUE_KEY, "QA", "a", "", "Given a");
    tracker.seed_test(ISSUE_KEY, "OTHER", "b", "", "Given b");

    assert_eq!(tracker.linked_tests(ISSUE_KEY, "QA").unwrap().len(), 1);
    assert_eq!(tracker.linked_tests(ISSUE_KEY, "OTHER").unwrap().len(), 1);
}

#[test]
fn memory_tracker_update_labels_and_delete() {
    let tracker = InMemoryTracker::new();
    let key = tracker.seed_test(ISSUE_KEY, PROJECT, "old", "", "Given a");

    tracker.update_test(&key, "new", "Given b").unwrap();
    tracker.add_labels(&key, &["x".to_string(), "x".to_string()]).unwrap();
    let stored = tracker.test(&key).unwrap();
    assert_eq!(stored.summary, "new");
    assert_eq!(stored.labels, vec!["x"]);

    tracker.delete(&key).unwrap();
    assert!(tracker.test(&key).is_none());
    assert!(tracker.links().is_empty());
    assert!(matches!(tracker.delete(&key), Err(TrackerError::NotFound(_))));
}

#[test]
fn memory_tracker_injected_failures() {
    let tracker = InMemoryTracker::new();
    let key = tracker.seed_test(ISSUE_KEY, PROJECT, "a", "", "Given a");

    tracker.fail_delete(&key, false);
    let err = tracker.delete(&key).unwrap_err();
    assert!(matches!(err, TrackerError::Http { status: 403, .. }));

    tracker.reject_link_type("Tests");
    assert!(tracker.link(&key, ISSUE_KEY, "Tests").is_err());
    assert!(tracker.link(&key, ISSUE_KEY, "Relates").is_ok());

    assert!(matches!(tracker.get_issue("NOPE-1"), Err(TrackerError::NotFound(_))));
}
