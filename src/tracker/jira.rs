use std::fmt;
use std::thread;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::document::{Node, to_text};

use super::error::TrackerError;
use super::model::{IssueComment, IssueDetails, LinkedTest, NewTest};
use super::{Tracker, test_description};

const ISSUE_FIELDS: &str = "summary,description,labels,comment";
const LINKED_TEST_FIELDS: &str = "summary,created,description";
const SEARCH_LIMIT: u32 = 100;
const TEST_ISSUE_TYPE: &str = "Test";

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for a Jira Cloud site.
#[derive(Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,

    /// Project new tests are created in when none is given.
    pub default_project: Option<String>,

    /// Link type used when the requested one is rejected.
    #[serde(default = "default_relates")]
    pub relates_link_type: String,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit; attempt `n` sleeps `n * backoff_ms`.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            token: None,
            default_project: None,
            relates_link_type: default_relates(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("default_project", &self.default_project)
            .field("relates_link_type", &self.relates_link_type)
            .field("max_retries", &self.max_retries)
            .field("backoff_ms", &self.backoff_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_relates() -> String { "Relates".to_string() }
fn default_max_retries() -> u32 { 3 }
fn default_backoff_ms() -> u64 { 600 }
fn default_timeout_secs() -> u64 { 30 }

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, TrackerError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TrackerError::Config(format!("{} is not set", name)))
}

// ============================================================================
// Client
// ============================================================================

/// Blocking Jira Cloud REST v3 client with retry on throttling and 5xx.
pub struct JiraClient {
    base_url: String,
    email: String,
    token: String,
    max_retries: u32,
    backoff: Duration,
    http: Client,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, TrackerError> {
        let base_url = required(&config.base_url, "jira base url")?;
        let email = required(&config.email, "jira email")?;
        let token = required(&config.token, "jira token")?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            token: token.to_string(),
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, retrying retryable failures with linear backoff.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, TrackerError> {
        let mut attempt = 1;
        loop {
            match self.send_once(method.clone(), path, query, body) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(
                        %method, path, attempt, max = self.max_retries, error = %e,
                        "jira request failed, retrying"
                    );
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
                Err(e) => {
                    error!(%method, path, attempt, error = %e, "jira request failed");
                    return Err(e);
                }
            }
        }
    }

    fn send_once(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, TrackerError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method, &url)
            .basic_auth(&self.email, Some(&self.token))
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let response = req
            .send()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| TrackerError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(TrackerError::Http {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| TrackerError::Decode {
            context: path.to_string(),
            message: e.to_string(),
        })
    }

    fn linked_issue_keys(&self, parent_key: &str) -> Result<Vec<String>, TrackerError> {
        let data = self.request(
            Method::GET,
            &format!("/rest/api/3/issue/{}", parent_key),
            &[("fields", "issuelinks".to_string())],
            None,
        )?;
        Ok(parse_linked_keys(&data))
    }
}

impl Tracker for JiraClient {
    fn get_issue(&self, key: &str) -> Result<IssueDetails, TrackerError> {
        let data = self.request(
            Method::GET,
            &format!("/rest/api/3/issue/{}", key),
            &[("fields", ISSUE_FIELDS.to_string())],
            None,
        )?;
        let issue = parse_issue(key, &data);
        info!(key, summary = %issue.summary, "read issue");
        Ok(issue)
    }

    fn create_test(&self, test: &NewTest) -> Result<String, TrackerError> {
        let description = test_description(&test.feature_text, &test.description_text);
        let body = json!({
            "fields": {
                "project": { "key": test.project },
                "summary": test.summary,
                "issuetype": { "name": TEST_ISSUE_TYPE },
                "labels": test.labels,
                "description": description,
            }
        });

        let data = self.request(Method::POST, "/rest/api/3/issue", &[], Some(&body))?;
        let key = data
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| TrackerError::Decode {
                context: "create issue".to_string(),
                message: "response has no key".to_string(),
            })?;

        info!(key, summary = %test.summary, "created test");
        Ok(key.to_string())
    }

    fn update_test(
        &self,
        key: &str,
        summary: &str,
        feature_text: &str,
    ) -> Result<(), TrackerError> {
        let body = json!({
            "fields": {
                "summary": summary,
                "description": test_description(feature_text, ""),
            }
        });
        self.request(Method::PUT, &format!("/rest/api/3/issue/{}", key), &[], Some(&body))?;
        info!(key, summary, "updated test");
        Ok(())
    }

    fn add_labels(&self, key: &str, labels: &[String]) -> Result<(), TrackerError> {
        let adds: Vec<Value> = labels.iter().map(|l| json!({ "add": l })).collect();
        let body = json!({ "update": { "labels": adds } });
        self.request(Method::PUT, &format!("/rest/api/3/issue/{}", key), &[], Some(&body))?;
        debug!(key, ?labels, "labels added");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), TrackerError> {
        warn!(key, "deleting issue");
        self.request(Method::DELETE, &format!("/rest/api/3/issue/{}", key), &[], None)?;
        Ok(())
    }

    fn linked_tests(
        &self,
        parent_key: &str,
        project_key: &str,
    ) -> Result<Vec<LinkedTest>, TrackerError> {
        let keys = self.linked_issue_keys(parent_key)?;
        if keys.is_empty() {
            debug!(parent_key, "no linked issues");
            return Ok(Vec::new());
        }

        let jql = format!(
            r#"key in ({}) AND project = "{}" AND issuetype = "{}""#,
            keys.join(","),
            project_key,
            TEST_ISSUE_TYPE
        );
        let data = self.request(
            Method::GET,
            "/rest/api/3/search/jql",
            &[
                ("jql", jql),
                ("fields", LINKED_TEST_FIELDS.to_string()),
                ("maxResults", SEARCH_LIMIT.to_string()),
            ],
            None,
        )?;

        let tests: Vec<LinkedTest> = data
            .get("issues")
            .and_then(Value::as_array)
            .map(|issues| issues.iter().filter_map(parse_linked_test).collect())
            .unwrap_or_default();

        info!(parent_key, count = tests.len(), "found linked tests");
        Ok(tests)
    }

    fn link(&self, from_key: &str, to_key: &str, link_type: &str) -> Result<(), TrackerError> {
        let body = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": from_key },
            "outwardIssue": { "key": to_key },
        });
        self.request(Method::POST, "/rest/api/3/issueLink", &[], Some(&body))?;
        debug!(from_key, to_key, link_type, "issues linked");
        Ok(())
    }
}

// ============================================================================
// Response parsing
// ============================================================================

/// Rich-text or plain field flattened to text.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v) => Node::from_value(v).map(|n| to_text(&n)).unwrap_or_default(),
        None => String::new(),
    }
}

fn str_field<'a>(fields: &'a Value, name: &str) -> &'a str {
    fields.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Issue details out of a `GET /issue/{key}` response.
pub fn parse_issue(key: &str, data: &Value) -> IssueDetails {
    let fields = data.get("fields").unwrap_or(&Value::Null);
    let description_raw = fields.get("description");

    let comments = fields
        .pointer("/comment/comments")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|c| IssueComment {
                    author: c
                        .pointer("/author/displayName")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown")
                        .to_string(),
                    body: field_text(c.get("body")),
                })
                .collect()
        })
        .unwrap_or_default();

    let labels = fields
        .get("labels")
        .and_then(Value::as_array)
        .map(|ls| ls.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();

    IssueDetails {
        key: key.to_string(),
        summary: str_field(fields, "summary").to_string(),
        description_text: field_text(description_raw),
        description: description_raw.and_then(Node::from_value),
        comments,
        labels,
    }
}

/// Keys on the other end of every issue link.
pub fn parse_linked_keys(data: &Value) -> Vec<String> {
    data.pointer("/fields/issuelinks")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(|link| {
                    link.pointer("/outwardIssue/key")
                        .or_else(|| link.pointer("/inwardIssue/key"))
                        .and_then(Value::as_str)
                        .map(String::from)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One search hit as a linked test. Hits without a key are skipped.
pub fn parse_linked_test(issue: &Value) -> Option<LinkedTest> {
    let key = issue.get("key")?.as_str()?;
    let fields = issue.get("fields").unwrap_or(&Value::Null);

    Some(LinkedTest {
        key: key.to_string(),
        summary: str_field(fields, "summary").to_string(),
        created: str_field(fields, "created").to_string(),
        description: fields.get("description").and_then(Node::from_value),
    })
}
