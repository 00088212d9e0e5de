use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::generate::ContextLimits;
use crate::sync::Prefer;
use crate::tracker::JiraConfig;
use crate::workflow::WorkflowSettings;

pub const DEFAULT_CONFIG_FILE: &str = "scenario-sync.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "scenario-sync",
    version,
    about = "Generate Gherkin test cases from tracker tickets and keep them in sync"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: scenario-sync.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console, global = true)]
    pub format: OutputFormat,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate scenarios for a ticket and reconcile its linked tests
    Sync {
        /// Requirements ticket key (e.g. PROJ-42)
        issue: String,

        /// Project the tests live in (default: jira.default_project)
        #[arg(long)]
        project: Option<String>,

        /// Maximum scenarios to request from the generator
        #[arg(long)]
        max_tests: Option<usize>,

        /// Link type between new tests and the ticket
        #[arg(long)]
        link_type: Option<String>,

        /// Which duplicate survives: newest or oldest
        #[arg(long)]
        prefer: Option<Prefer>,

        /// Scenario generator: ollama or mock
        #[arg(long)]
        generator: Option<String>,

        /// Append every tracker mutation to this JSON-lines file
        #[arg(long)]
        journal: Option<String>,
    },

    /// Delete duplicate tests linked to a ticket
    Dedupe {
        issue: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        prefer: Option<Prefer>,
    },

    /// Show what a sync would do without changing the tracker
    Preview {
        issue: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        max_tests: Option<usize>,

        #[arg(long)]
        generator: Option<String>,
    },

    /// Write the linked tests of a ticket as .feature files
    Export {
        issue: String,

        #[arg(long)]
        project: Option<String>,

        /// Output directory for the .feature files
        #[arg(short, long, default_value = "features")]
        output_dir: String,
    },

    /// Show the resolved configuration
    Diag,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },

    #[error("{0} is not configured (set it in the config file or the environment)")]
    Missing(&'static str),
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `scenario-sync.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// `ollama` or `mock`
    #[serde(default = "default_generator")]
    pub generator: String,

    pub endpoint: Option<String>,
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    #[serde(default = "default_max_comments")]
    pub max_comments: usize,

    #[serde(default = "default_max_comment_chars")]
    pub max_comment_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            endpoint: None,
            model: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_generation_timeout(),
            max_context_chars: default_max_context_chars(),
            max_comments: default_max_comments(),
            max_comment_chars: default_max_comment_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_max_tests")]
    pub max_tests: usize,

    #[serde(default = "default_link_type")]
    pub link_type: String,

    #[serde(default)]
    pub prefer: Prefer,

    #[serde(default = "default_labels")]
    pub labels: Vec<String>,

    #[serde(default = "default_obsolete_label")]
    pub obsolete_label: String,

    pub journal: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_tests: default_max_tests(),
            link_type: default_link_type(),
            prefer: Prefer::default(),
            labels: default_labels(),
            obsolete_label: default_obsolete_label(),
            journal: None,
        }
    }
}

// Serde default helpers
fn default_generator() -> String { "ollama".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_output_tokens() -> u32 { 2048 }
fn default_generation_timeout() -> u64 { 120 }
fn default_max_context_chars() -> usize { 16_000 }
fn default_max_comments() -> usize { 10 }
fn default_max_comment_chars() -> usize { 600 }
fn default_max_tests() -> usize { 8 }
fn default_link_type() -> String { "Tests".to_string() }
fn default_labels() -> Vec<String> { vec!["mcp".to_string(), "auto-generated".to_string()] }
fn default_obsolete_label() -> String { "revisar-obsoleto".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file.
///
/// Without an explicit path, `scenario-sync.yaml` is tried and defaults are
/// returned if it is missing or malformed. An explicit path must exist and
/// parse.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(load_default_config(DEFAULT_CONFIG_FILE));
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn load_default_config(path: impl AsRef<Path>) -> AppConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            name: name.to_string(),
            value,
        })
}

impl AppConfig {
    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("JIRA_BASE") {
            self.jira.base_url = Some(v);
        }
        if let Some(v) = get("JIRA_EMAIL") {
            self.jira.email = Some(v);
        }
        if let Some(v) = get("JIRA_TOKEN") {
            self.jira.token = Some(v);
        }
        if let Some(v) = get("DEFAULT_PROJECT_KEY") {
            self.jira.default_project = Some(v);
        }
        if let Some(v) = get("RELATES_LINK_TYPE") {
            self.jira.relates_link_type = v;
        }
        if let Some(v) = get("JIRA_MAX_RETRIES") {
            self.jira.max_retries = parse_env("JIRA_MAX_RETRIES", v)?;
        }
        if let Some(v) = get("JIRA_BACKOFF_MS") {
            self.jira.backoff_ms = parse_env("JIRA_BACKOFF_MS", v)?;
        }
        if let Some(v) = get("OLLAMA_ENDPOINT") {
            self.generation.endpoint = Some(v);
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.generation.model = Some(v);
        }
        if let Some(v) = get("LLM_MAX_CONTEXT_CHARS") {
            self.generation.max_context_chars = parse_env("LLM_MAX_CONTEXT_CHARS", v)?;
        }
        if let Some(v) = get("LLM_MAX_COMMENTS") {
            self.generation.max_comments = parse_env("LLM_MAX_COMMENTS", v)?;
        }
        if let Some(v) = get("LLM_MAX_COMMENT_CHARS") {
            self.generation.max_comment_chars = parse_env("LLM_MAX_COMMENT_CHARS", v)?;
        }
        Ok(())
    }

    /// Apply the global CLI flags, which win over file and environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref endpoint) = cli.ollama_endpoint {
            self.generation.endpoint = Some(endpoint.clone());
        }
        if let Some(ref model) = cli.ollama_model {
            self.generation.model = Some(model.clone());
        }
    }

    /// Jira settings, provided the site and credentials are all set.
    pub fn require_jira(&self) -> Result<&JiraConfig, ConfigError> {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !set(&self.jira.base_url) {
            return Err(ConfigError::Missing("JIRA_BASE"));
        }
        if !set(&self.jira.email) {
            return Err(ConfigError::Missing("JIRA_EMAIL"));
        }
        if !set(&self.jira.token) {
            return Err(ConfigError::Missing("JIRA_TOKEN"));
        }
        Ok(&self.jira)
    }

    /// Explicit project, else the configured default.
    pub fn resolve_project(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .or(self.jira.default_project.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::Missing("DEFAULT_PROJECT_KEY"))
    }

    pub fn context_limits(&self) -> ContextLimits {
        ContextLimits {
            max_context_chars: self.generation.max_context_chars,
            max_comments: self.generation.max_comments,
            max_comment_chars: self.generation.max_comment_chars,
        }
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            limits: self.context_limits(),
            base_labels: self.sync.labels.clone(),
            obsolete_label: self.sync.obsolete_label.clone(),
            relates_link_type: self.jira.relates_link_type.clone(),
        }
    }
}
