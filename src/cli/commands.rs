use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::cli::config::{AppConfig, GenerationConfig, OutputFormat};
use crate::generate::{MockGenerator, OllamaGenerator, ScenarioGenerator};
use crate::report::console::{format_dedupe_report, format_preview, format_sync_report};
use crate::sync::Prefer;
use crate::trace::ActionJournal;
use crate::tracker::{JiraClient, Tracker};
use crate::workflow::{SyncRequest, SyncWorkflow, TestSuiteService};

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// sync subcommand
// ============================================================================

/// Run a full sync and return whether every action succeeded.
#[allow(clippy::too_many_arguments)]
pub fn cmd_sync(
    config: &AppConfig,
    format: OutputFormat,
    issue: &str,
    project: Option<&str>,
    max_tests: Option<usize>,
    link_type: Option<&str>,
    prefer: Option<Prefer>,
    generator_name: Option<&str>,
    journal: Option<&str>,
) -> CmdResult<bool> {
    let tracker = JiraClient::new(config.require_jira()?)?;
    let generator = build_generator(
        generator_name.unwrap_or(&config.generation.generator),
        &config.generation,
    )?;

    let journal = match journal.or(config.sync.journal.as_deref()) {
        Some(path) => ActionJournal::open(path),
        None => ActionJournal::disabled(),
    };

    let request = SyncRequest {
        issue_key: issue.to_string(),
        project_key: config.resolve_project(project)?,
        link_type: link_type.unwrap_or(&config.sync.link_type).to_string(),
        max_tests: max_tests.unwrap_or(config.sync.max_tests),
        prefer: prefer.unwrap_or(config.sync.prefer),
    };

    let workflow = SyncWorkflow::new(&tracker, generator.as_ref())
        .with_settings(config.workflow_settings())
        .with_journal(&journal);
    let report = workflow.generate_and_reconcile(&request);

    emit(format, &report, format_sync_report)?;
    Ok(report.ok)
}

// ============================================================================
// dedupe subcommand
// ============================================================================

pub fn cmd_dedupe(
    config: &AppConfig,
    format: OutputFormat,
    issue: &str,
    project: Option<&str>,
    prefer: Option<Prefer>,
) -> CmdResult<bool> {
    let tracker = JiraClient::new(config.require_jira()?)?;
    let project = config.resolve_project(project)?;
    // dedupe never calls the generator
    let generator = MockGenerator::new(Vec::new());

    let workflow =
        SyncWorkflow::new(&tracker, &generator).with_settings(config.workflow_settings());
    let report = workflow.dedupe(issue, &project, prefer.unwrap_or(config.sync.prefer));

    emit(format, &report, format_dedupe_report)?;
    Ok(report.ok)
}

// ============================================================================
// preview subcommand
// ============================================================================

pub fn cmd_preview(
    config: &AppConfig,
    format: OutputFormat,
    issue: &str,
    project: Option<&str>,
    max_tests: Option<usize>,
    generator_name: Option<&str>,
) -> CmdResult<()> {
    let tracker = JiraClient::new(config.require_jira()?)?;
    let generator = build_generator(
        generator_name.unwrap_or(&config.generation.generator),
        &config.generation,
    )?;

    let mut request = SyncRequest::new(issue, &config.resolve_project(project)?);
    request.max_tests = max_tests.unwrap_or(config.sync.max_tests);
    request.prefer = config.sync.prefer;

    let workflow =
        SyncWorkflow::new(&tracker, generator.as_ref()).with_settings(config.workflow_settings());
    let preview = workflow.preview(&request)?;

    emit(format, &preview, format_preview)
}

// ============================================================================
// export subcommand
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFeature {
    pub key: String,
    pub path: PathBuf,
}

pub fn cmd_export(
    config: &AppConfig,
    format: OutputFormat,
    issue: &str,
    project: Option<&str>,
    output_dir: &str,
) -> CmdResult<()> {
    let tracker = JiraClient::new(config.require_jira()?)?;
    let project = config.resolve_project(project)?;
    let exported = export_features(&tracker, issue, &project, Path::new(output_dir))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&exported)?),
        OutputFormat::Console => {
            for feature in &exported {
                println!("  {}  {}", feature.key, feature.path.display());
            }
            println!("Exported {} features to {}/", exported.len(), output_dir);
        }
    }
    Ok(())
}

/// Write the gherkin of every linked test to `<dir>/<key>_<summary>.feature`.
/// Tests without a gherkin code block are skipped.
pub fn export_features(
    tracker: &dyn Tracker,
    issue: &str,
    project: &str,
    output_dir: &Path,
) -> CmdResult<Vec<ExportedFeature>> {
    let linked = tracker.linked_tests(issue, project)?;
    std::fs::create_dir_all(output_dir)?;

    let mut exported = Vec::new();
    for test in &linked {
        let feature = test.feature_text();
        if feature.trim().is_empty() {
            debug!(key = %test.key, "no gherkin block, skipping");
            continue;
        }

        let filename = format!(
            "{}_{}.feature",
            sanitize_filename(&test.key),
            sanitize_filename(&test.summary)
        );
        let path = output_dir.join(filename);
        std::fs::write(&path, &feature)?;
        info!(key = %test.key, path = %path.display(), "feature exported");

        exported.push(ExportedFeature {
            key: test.key.clone(),
            path,
        });
    }
    Ok(exported)
}

// ============================================================================
// diag subcommand
// ============================================================================

/// Resolved settings, with credentials reduced to whether they are set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagReport {
    pub jira_base: Option<String>,
    pub jira_email_set: bool,
    pub jira_token_set: bool,
    pub default_project: Option<String>,
    pub relates_link_type: String,
    pub generator: String,
    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub journal: Option<String>,
    pub status: &'static str,
}

pub fn diag_report(config: &AppConfig) -> DiagReport {
    let defaults = OllamaGenerator::default();
    DiagReport {
        jira_base: config.jira.base_url.clone(),
        jira_email_set: config.jira.email.is_some(),
        jira_token_set: config.jira.token.is_some(),
        default_project: config.jira.default_project.clone(),
        relates_link_type: config.jira.relates_link_type.clone(),
        generator: config.generation.generator.clone(),
        ollama_endpoint: config
            .generation
            .endpoint
            .clone()
            .unwrap_or(defaults.endpoint),
        ollama_model: config.generation.model.clone().unwrap_or(defaults.model),
        journal: config.sync.journal.clone(),
        status: if config.require_jira().is_ok() { "ok" } else { "incomplete" },
    }
}

pub fn cmd_diag(config: &AppConfig, format: OutputFormat) -> CmdResult<()> {
    let report = diag_report(config);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Console => {
            println!("jira base:        {}", report.jira_base.as_deref().unwrap_or("-"));
            println!("jira email set:   {}", report.jira_email_set);
            println!("jira token set:   {}", report.jira_token_set);
            println!("default project:  {}", report.default_project.as_deref().unwrap_or("-"));
            println!("relates link:     {}", report.relates_link_type);
            println!("generator:        {}", report.generator);
            println!("ollama endpoint:  {}", report.ollama_endpoint);
            println!("ollama model:     {}", report.ollama_model);
            println!("status:           {}", report.status);
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the scenario generator named `name`.
pub fn build_generator(
    name: &str,
    config: &GenerationConfig,
) -> CmdResult<Box<dyn ScenarioGenerator>> {
    match name {
        "ollama" => {
            let defaults = OllamaGenerator::default();
            let endpoint = config.endpoint.as_deref().unwrap_or(&defaults.endpoint);
            let model = config.model.as_deref().unwrap_or(&defaults.model);
            let generator = OllamaGenerator::new(endpoint, model)
                .with_sampling(config.temperature, config.max_output_tokens)
                .with_timeout(std::time::Duration::from_secs(config.timeout_secs));
            Ok(Box::new(generator))
        }
        "mock" => Ok(Box::new(MockGenerator::sample())),
        other => Err(format!("unknown generator '{}' (expected ollama or mock)", other).into()),
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, console: fn(&T) -> String) -> CmdResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Console => print!("{}", console(value)),
    }
    Ok(())
}

/// Sanitize a test summary into a safe filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
