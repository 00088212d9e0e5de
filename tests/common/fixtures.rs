use scenario_sync::feature::{ScenarioRecord, render_feature};
use scenario_sync::sync::ExistingTestRecord;
use scenario_sync::text::format_summary;
use scenario_sync::tracker::{InMemoryTracker, IssueComment, IssueDetails};

pub const ISSUE_KEY: &str = "TEST-1";
pub const PROJECT: &str = "QA";
pub const SUMMARY: &str = "Test Sync Logic";

pub fn scenario(title: &str, steps: &str) -> ScenarioRecord {
    ScenarioRecord::new(title, steps)
}

/// An existing record the way a tracker summary of `TEST-1 | <title>` yields it.
pub fn existing(key: &str, title: &str, steps: &str) -> ExistingTestRecord {
    ExistingTestRecord::new(ISSUE_KEY, key, "", format!("{} | {}", ISSUE_KEY, title), steps)
}

pub fn existing_at(key: &str, created: &str, title: &str, steps: &str) -> ExistingTestRecord {
    ExistingTestRecord::new(ISSUE_KEY, key, created, format!("{} | {}", ISSUE_KEY, title), steps)
}

pub fn issue() -> IssueDetails {
    IssueDetails {
        key: ISSUE_KEY.to_string(),
        summary: SUMMARY.to_string(),
        description_text: "As a user I want to log in so that I can see my dashboard.".to_string(),
        description: None,
        comments: vec![IssueComment {
            author: "Ana".to_string(),
            body: "Remember the lockout after five failed attempts.".to_string(),
        }],
        labels: Vec::new(),
    }
}

pub fn tracker() -> InMemoryTracker {
    InMemoryTracker::new().with_issue(issue())
}

/// Seed a test the way a previous sync run would have stored it.
pub fn seed_generated(
    tracker: &InMemoryTracker,
    sequence: u32,
    title: &str,
    steps: &str,
    created: &str,
) -> String {
    let summary = format_summary(ISSUE_KEY, sequence, title);
    let feature = render_feature(SUMMARY, ISSUE_KEY, &scenario(title, steps));
    tracker.seed_test(ISSUE_KEY, PROJECT, &summary, created, &feature)
}

pub const LOGIN_STEPS: &str =
    "Given a registered user on the login page\nWhen the user submits valid credentials\nThen the dashboard is shown";
pub const WRONG_PASSWORD_STEPS: &str =
    "Given a registered user on the login page\nWhen the user submits a wrong password\nThen an error message is shown";
