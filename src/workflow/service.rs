use std::time::Instant;

use tracing::{info, warn};

use crate::feature::{ScenarioRecord, render_feature};
use crate::generate::{
    ContextLimits, GenerationOutcome, GenerationRequest, ScenarioGenerator, TaskKind,
    build_context, classify_task,
};
use crate::report::{
    ActionKind, CreatedTest, DedupeReport, SyncPreview, SyncReport, UpdatedTest,
};
use crate::sync::{
    DedupeOutcome, ExistingTestRecord, Prefer, ReconciliationPlan, dedupe_scenarios,
    find_duplicates, plan, resolve,
};
use crate::text::{format_summary, next_sequence};
use crate::trace::{ActionJournal, JournalEvent};
use crate::tracker::{IssueDetails, LinkedTest, NewTest, Tracker, TrackerError};

use super::error::WorkflowError;

const PREVIEW_CHARS: usize = 300;

// ============================================================================
// Requests and settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub issue_key: String,
    pub project_key: String,
    /// Link type used between a new test and the ticket.
    pub link_type: String,
    pub max_tests: usize,
    pub prefer: Prefer,
}

impl SyncRequest {
    pub fn new(issue_key: &str, project_key: &str) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            project_key: project_key.to_string(),
            link_type: "Tests".to_string(),
            max_tests: 8,
            prefer: Prefer::Newest,
        }
    }
}

/// Knobs shared by every run of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub limits: ContextLimits,
    pub base_labels: Vec<String>,
    pub obsolete_label: String,
    /// Fallback when the requested link type is rejected.
    pub relates_link_type: String,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            limits: ContextLimits::default(),
            base_labels: vec!["mcp".to_string(), "auto-generated".to_string()],
            obsolete_label: "revisar-obsoleto".to_string(),
            relates_link_type: "Relates".to_string(),
        }
    }
}

/// The operations offered to callers of the engine.
pub trait TestSuiteService {
    /// Generate scenarios for a ticket and reconcile its linked tests.
    /// Never fails: problems are reported through `ok`, `error` and `failures`.
    fn generate_and_reconcile(&self, request: &SyncRequest) -> SyncReport;

    /// Plan a run without writing to the tracker.
    fn preview(&self, request: &SyncRequest) -> Result<SyncPreview, WorkflowError>;

    /// Delete duplicate tests linked to a ticket, keeping one per signature.
    fn dedupe(&self, issue_key: &str, project_key: &str, prefer: Prefer) -> DedupeReport;
}

// ============================================================================
// Workflow
// ============================================================================

/// Reads, generates and plans before any write happens.
struct Prepared {
    issue: IssueDetails,
    task: TaskKind,
    method: String,
    linked: Vec<LinkedTest>,
    plan: ReconciliationPlan,
}

/// [`TestSuiteService`] over a tracker and a scenario generator.
pub struct SyncWorkflow<'a> {
    tracker: &'a dyn Tracker,
    generator: &'a dyn ScenarioGenerator,
    settings: WorkflowSettings,
    journal: Option<&'a ActionJournal>,
}

impl<'a> SyncWorkflow<'a> {
    pub fn new(tracker: &'a dyn Tracker, generator: &'a dyn ScenarioGenerator) -> Self {
        Self {
            tracker,
            generator,
            settings: WorkflowSettings::default(),
            journal: None,
        }
    }

    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_journal(mut self, journal: &'a ActionJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    fn journal(&self, event: JournalEvent) {
        if let Some(journal) = self.journal {
            journal.log(&event);
        }
    }

    fn linked_records(
        &self,
        issue_key: &str,
        project_key: &str,
    ) -> Result<(Vec<LinkedTest>, Vec<ExistingTestRecord>), WorkflowError> {
        let linked = self
            .tracker
            .linked_tests(issue_key, project_key)
            .map_err(|source| WorkflowError::LinkedTests {
                key: issue_key.to_string(),
                source,
            })?;
        let records = linked
            .iter()
            .map(|t| ExistingTestRecord::from_linked(issue_key, t))
            .collect();
        Ok((linked, records))
    }

    fn prepare(&self, request: &SyncRequest) -> Result<Prepared, WorkflowError> {
        if request.project_key.trim().is_empty() {
            return Err(WorkflowError::MissingProject);
        }

        let issue = self
            .tracker
            .get_issue(&request.issue_key)
            .map_err(|source| WorkflowError::ReadIssue {
                key: request.issue_key.clone(),
                source,
            })?;

        let context_text = build_context(
            &issue.description_text,
            &issue.comments,
            &self.settings.limits,
        );
        let task = classify_task(&issue.summary, &issue.labels);

        let outcome = self.generator.generate(&GenerationRequest {
            context_key: &issue.key,
            summary: &issue.summary,
            context_text: &context_text,
            max_count: request.max_tests,
            system_prompt: task.system_prompt(),
        });
        let (scenarios, method) = match outcome {
            GenerationOutcome::Generated { scenarios, method } => (scenarios, method),
            GenerationOutcome::Unavailable { reason } => {
                return Err(WorkflowError::GenerationUnavailable(reason));
            }
        };

        let generated = scenarios.len();
        let scenarios = dedupe_scenarios(&issue.key, scenarios);
        if scenarios.len() < generated {
            info!(
                dropped = generated - scenarios.len(),
                "dropped repeated generated scenarios"
            );
        }

        let (linked, records) = self.linked_records(&issue.key, &request.project_key)?;
        let plan = plan(&issue.key, &records, &scenarios);

        Ok(Prepared {
            issue,
            task,
            method,
            linked,
            plan,
        })
    }

    fn labels_for(&self, task: TaskKind) -> Vec<String> {
        let mut labels = self.settings.base_labels.clone();
        labels.extend(task.extra_labels().iter().map(|l| l.to_string()));
        labels
    }

    fn link_to_issue(
        &self,
        test_key: &str,
        issue_key: &str,
        link_type: &str,
    ) -> Result<(), TrackerError> {
        match self.tracker.link(test_key, issue_key, link_type) {
            Ok(()) => Ok(()),
            Err(e) if link_type != self.settings.relates_link_type => {
                warn!(
                    key = test_key,
                    link_type,
                    error = %e,
                    fallback = %self.settings.relates_link_type,
                    "link rejected, retrying with fallback type"
                );
                self.tracker
                    .link(test_key, issue_key, &self.settings.relates_link_type)
            }
            Err(e) => Err(e),
        }
    }

    fn apply_updates(&self, prepared: &Prepared, report: &mut SyncReport) {
        let issue = &prepared.issue;

        for update in &prepared.plan.to_update {
            let scenario = ScenarioRecord::new(&update.title, &update.steps);
            let feature = render_feature(&issue.summary, &issue.key, &scenario);
            let result = self.tracker.update_test(&update.key, &update.summary, &feature);

            self.journal(
                JournalEvent::now(&issue.key, ActionKind::Update)
                    .with_key(&update.key)
                    .with_outcome(&result),
            );
            match result {
                Ok(()) => {
                    info!(key = %update.key, summary = %update.summary, "test updated");
                    report.updated.push(UpdatedTest {
                        key: update.key.clone(),
                        summary: update.summary.clone(),
                    });
                }
                Err(e) => {
                    warn!(key = %update.key, error = %e, "update failed");
                    report.record_failure(ActionKind::Update, &update.key, e);
                }
            }
        }
    }

    fn apply_creates(&self, prepared: &Prepared, request: &SyncRequest, report: &mut SyncReport) {
        let issue = &prepared.issue;
        let labels = self.labels_for(prepared.task);
        let mut sequence = next_sequence(prepared.linked.iter().map(|t| t.summary.as_str()));

        for scenario in &prepared.plan.to_create {
            let summary = format_summary(&issue.key, sequence, &scenario.title);
            let feature = render_feature(&issue.summary, &issue.key, scenario);
            let new_test = NewTest {
                project: request.project_key.clone(),
                summary: summary.clone(),
                description_text: format!("Auto-generated test for {}.", issue.key),
                feature_text: feature.clone(),
                labels: labels.clone(),
            };

            let result = self.tracker.create_test(&new_test);
            let mut event = JournalEvent::now(&issue.key, ActionKind::Create)
                .with_detail(&summary)
                .with_outcome(&result);
            if let Ok(key) = &result {
                event = event.with_key(key);
            }
            self.journal(event);
            let key = match result {
                Ok(key) => key,
                Err(e) => {
                    warn!(summary = %summary, error = %e, "create failed");
                    report.record_failure(ActionKind::Create, &summary, e);
                    continue;
                }
            };
            info!(key = %key, summary = %summary, "test created");

            let linked = self.link_to_issue(&key, &issue.key, &request.link_type);
            self.journal(
                JournalEvent::now(&issue.key, ActionKind::Link)
                    .with_key(&key)
                    .with_outcome(&linked),
            );
            if let Err(e) = linked {
                warn!(key = %key, error = %e, "test created but not linked");
                report.record_failure(ActionKind::Link, &key, e);
            }

            report.created.push(CreatedTest {
                key,
                summary,
                tc_tag: format!("TC{:02}", sequence),
                preview: feature.chars().take(PREVIEW_CHARS).collect(),
            });
            sequence += 1;
        }
    }

    fn apply_obsolete(&self, prepared: &Prepared, report: &mut SyncReport) {
        let label = vec![self.settings.obsolete_label.clone()];

        for record in &prepared.plan.obsolete {
            let result = self.tracker.add_labels(&record.key, &label);
            self.journal(
                JournalEvent::now(&prepared.issue.key, ActionKind::Label)
                    .with_key(&record.key)
                    .with_outcome(&result),
            );
            match result {
                Ok(()) => report.marked_obsolete.push(record.key.clone()),
                Err(e) => {
                    warn!(key = %record.key, error = %e, "could not flag obsolete test");
                    report.record_failure(ActionKind::Label, &record.key, e);
                }
            }
        }
    }

    fn resolve_duplicates(
        &self,
        issue_key: &str,
        project_key: &str,
        prefer: Prefer,
    ) -> Result<DedupeOutcome, WorkflowError> {
        let (_, records) = self.linked_records(issue_key, project_key)?;
        let outcome = resolve(&records, prefer, self.tracker);

        for key in &outcome.deleted {
            self.journal(JournalEvent::now(issue_key, ActionKind::Delete).with_key(key));
        }
        for failure in &outcome.failures {
            let result: Result<(), &str> = Err(&failure.reason);
            self.journal(
                JournalEvent::now(issue_key, ActionKind::Delete)
                    .with_key(&failure.key)
                    .with_outcome(&result),
            );
        }
        Ok(outcome)
    }
}

impl TestSuiteService for SyncWorkflow<'_> {
    fn generate_and_reconcile(&self, request: &SyncRequest) -> SyncReport {
        let started = Instant::now();
        info!(issue = %request.issue_key, project = %request.project_key, "sync started");

        let prepared = match self.prepare(request) {
            Ok(p) => p,
            Err(e) => {
                warn!(issue = %request.issue_key, error = %e, "sync aborted");
                let mut report = SyncReport::failed(&request.issue_key, e);
                report.elapsed_ms = started.elapsed().as_millis();
                return report;
            }
        };

        let mut report = SyncReport::new(&prepared.issue.key);
        report.generation_method = Some(prepared.method.clone());
        report.title_collisions = prepared.plan.title_collisions.clone();

        self.apply_updates(&prepared, &mut report);
        self.apply_creates(&prepared, request, &mut report);
        self.apply_obsolete(&prepared, &mut report);

        match self.resolve_duplicates(&prepared.issue.key, &request.project_key, request.prefer) {
            Ok(outcome) => {
                if !outcome.failures.is_empty() {
                    report.ok = false;
                }
                report.dedupe = outcome;
            }
            Err(e) => {
                warn!(error = %e, "duplicate resolution skipped");
                report.record_failure(ActionKind::ListLinked, &prepared.issue.key, e);
            }
        }

        report.elapsed_ms = started.elapsed().as_millis();
        let counts = report.counts();
        info!(
            issue = %report.issue_key,
            created = counts.created,
            updated = counts.updated,
            obsolete = counts.obsolete,
            deleted = counts.deleted,
            failed = counts.failed,
            elapsed_ms = report.elapsed_ms as u64,
            "sync finished"
        );
        report
    }

    fn preview(&self, request: &SyncRequest) -> Result<SyncPreview, WorkflowError> {
        let prepared = self.prepare(request)?;
        let records: Vec<ExistingTestRecord> = prepared
            .linked
            .iter()
            .map(|t| ExistingTestRecord::from_linked(&prepared.issue.key, t))
            .collect();
        let duplicates = find_duplicates(&records, request.prefer);

        Ok(SyncPreview {
            issue_key: prepared.issue.key.clone(),
            generation_method: prepared.method,
            next_sequence: next_sequence(prepared.linked.iter().map(|t| t.summary.as_str())),
            duplicate_drops: duplicates.drop.into_iter().map(|r| r.key).collect(),
            plan: prepared.plan,
        })
    }

    fn dedupe(&self, issue_key: &str, project_key: &str, prefer: Prefer) -> DedupeReport {
        let mut report = DedupeReport {
            issue_key: issue_key.to_string(),
            project_key: project_key.to_string(),
            prefer,
            ok: true,
            error: None,
            outcome: DedupeOutcome::default(),
        };

        match self.resolve_duplicates(issue_key, project_key, prefer) {
            Ok(outcome) => {
                report.ok = outcome.failures.is_empty();
                report.outcome = outcome;
            }
            Err(e) => {
                warn!(issue = issue_key, error = %e, "dedupe aborted");
                report.ok = false;
                report.error = Some(e.to_string());
            }
        }
        report
    }
}
