use crate::report::report_model::{DedupeReport, SyncPreview, SyncReport};
use crate::sync::DedupeOutcome;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a sync report for terminal output.
///
/// Produces output like:
/// ```text
/// === Sync: PROJ-42 (mock) ===
///
/// + CREATE  QA-101  PROJ-42 | TC03 | Validate logout
/// ~ UPDATE  QA-100  PROJ-42 | TC01 | Validate login
/// ! OBSOLETE QA-99
/// - DELETE  QA-98
///     [FAIL] link QA-101: HTTP 400
///
/// === Results: 1 created, 1 updated, 1 obsolete, 1 deleted, 1 failed in 0.4s ===
/// ```
pub fn format_sync_report(report: &SyncReport) -> String {
    let mut out = String::new();

    let method = report.generation_method.as_deref().unwrap_or("not generated");
    out.push_str(&format!("=== Sync: {} ({}) ===\n\n", report.issue_key, method));

    if let Some(ref error) = report.error {
        out.push_str(&format!("    [ERROR] {}\n", error));
    }

    for created in &report.created {
        out.push_str(&format!("+ CREATE  {}  {}\n", created.key, created.summary));
    }
    for updated in &report.updated {
        out.push_str(&format!("~ UPDATE  {}  {}\n", updated.key, updated.summary));
    }
    for key in &report.marked_obsolete {
        out.push_str(&format!("! OBSOLETE {}\n", key));
    }
    for collision in &report.title_collisions {
        out.push_str(&format!(
            "    [WARN] {} shadows {} ({})\n",
            collision.kept, collision.shadowed, collision.title
        ));
    }
    push_dedupe_lines(&mut out, &report.dedupe);

    for failure in &report.failures {
        out.push_str(&format!(
            "    [FAIL] {} {}: {}\n",
            failure.kind, failure.target, failure.reason
        ));
    }

    let counts = report.counts();
    out.push_str(&format!(
        "\n=== Results: {} created, {} updated, {} obsolete, {} deleted, {} failed",
        counts.created, counts.updated, counts.obsolete, counts.deleted, counts.failed
    ));
    let secs = report.elapsed_ms as f64 / 1000.0;
    out.push_str(&format!(" in {:.1}s ===\n", secs));

    out
}

pub fn format_dedupe_report(report: &DedupeReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Dedupe: {} in {} (keep {}) ===\n\n",
        report.issue_key, report.project_key, report.prefer
    ));
    if let Some(ref error) = report.error {
        out.push_str(&format!("    [ERROR] {}\n", error));
    }
    push_dedupe_lines(&mut out, &report.outcome);

    out.push_str(&format!(
        "\n=== Results: {} kept, {} dropped, {} deleted, {} failed ===\n",
        report.outcome.kept.len(),
        report.outcome.dropped.len(),
        report.outcome.deleted.len(),
        report.outcome.failures.len()
    ));
    out
}

pub fn format_preview(preview: &SyncPreview) -> String {
    let mut out = String::new();
    let plan = &preview.plan;

    out.push_str(&format!(
        "=== Preview: {} ({}) ===\n\n",
        preview.issue_key, preview.generation_method
    ));

    let mut sequence = preview.next_sequence;
    for scenario in &plan.to_create {
        out.push_str(&format!("+ CREATE  TC{:02}  {}\n", sequence, scenario.title));
        sequence += 1;
    }
    for update in &plan.to_update {
        out.push_str(&format!("~ UPDATE  {}  {}\n", update.key, update.summary));
    }
    for record in &plan.obsolete {
        out.push_str(&format!("! OBSOLETE {}  {}\n", record.key, record.raw_summary));
    }
    for key in &preview.duplicate_drops {
        out.push_str(&format!("- DELETE  {}\n", key));
    }

    if plan.is_empty() && preview.duplicate_drops.is_empty() {
        out.push_str("(nothing to do)\n");
    }

    out.push_str(&format!(
        "\n=== Plan: {} to create, {} to update, {} obsolete, {} duplicates ===\n",
        plan.to_create.len(),
        plan.to_update.len(),
        plan.obsolete.len(),
        preview.duplicate_drops.len()
    ));
    out
}

fn push_dedupe_lines(out: &mut String, outcome: &DedupeOutcome) {
    for key in &outcome.deleted {
        out.push_str(&format!("- DELETE  {}\n", key));
    }
    for failure in &outcome.failures {
        let retry = if failure.retryable { " (retryable)" } else { "" };
        out.push_str(&format!(
            "    [FAIL] delete {}: {}{}\n",
            failure.key, failure.reason, retry
        ));
    }
}
