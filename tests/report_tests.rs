use scenario_sync::report::console::{format_dedupe_report, format_preview, format_sync_report};
use scenario_sync::report::{
    ActionKind, CreatedTest, DedupeReport, SyncPreview, SyncReport, UpdatedTest,
};
use scenario_sync::sync::{
    DedupeOutcome, DeletionFailure, PlannedUpdate, Prefer, ReconciliationPlan, TitleCollision,
};

use crate::common::fixtures::{existing, scenario};

mod common;

// ============================================================================
// Helper builders
// ============================================================================

fn busy_report() -> SyncReport {
    let mut report = SyncReport::new("PROJ-42");
    report.generation_method = Some("mock".to_string());
    report.created.push(CreatedTest {
        key: "QA-101".to_string(),
        summary: "PROJ-42 | TC03 | Validate logout".to_string(),
        tc_tag: "TC03".to_string(),
        preview: String::new(),
    });
    report.updated.push(UpdatedTest {
        key: "QA-100".to_string(),
        summary: "PROJ-42 | TC01 | Validate login".to_string(),
    });
    report.marked_obsolete.push("QA-99".to_string());
    report.title_collisions.push(TitleCollision {
        title: "Validate login".to_string(),
        kept: "QA-100".to_string(),
        shadowed: "QA-97".to_string(),
    });
    report.dedupe = DedupeOutcome {
        kept: vec!["QA-100".to_string()],
        dropped: vec!["QA-98".to_string(), "QA-96".to_string()],
        deleted: vec!["QA-98".to_string()],
        failures: vec![DeletionFailure {
            key: "QA-96".to_string(),
            reason: "HTTP 503".to_string(),
            retryable: true,
        }],
    };
    report.record_failure(ActionKind::Link, "QA-101", "HTTP 400");
    report.elapsed_ms = 1300;
    report
}

// ============================================================================
// SyncReport model
// ============================================================================

#[test]
fn new_report_is_ok_until_a_failure() {
    let mut report = SyncReport::new("PROJ-1");
    assert!(report.ok);
    assert!(report.error.is_none());

    report.record_failure(ActionKind::Update, "QA-1", "HTTP 500");
    assert!(!report.ok);
    assert_eq!(report.failures[0].kind, ActionKind::Update);
    assert_eq!(report.failures[0].reason, "HTTP 500");
}

#[test]
fn failed_report_carries_error() {
    let report = SyncReport::failed("PROJ-1", "could not read issue PROJ-1");
    assert!(!report.ok);
    assert_eq!(report.error.as_deref(), Some("could not read issue PROJ-1"));
    assert_eq!(report.counts().created, 0);
}

#[test]
fn counts_include_dedupe_failures() {
    let counts = busy_report().counts();
    assert_eq!(counts.created, 1);
    assert_eq!(counts.updated, 1);
    assert_eq!(counts.obsolete, 1);
    assert_eq!(counts.deleted, 1);
    assert_eq!(counts.failed, 2);
}

#[test]
fn sync_report_json_shape() {
    let value = serde_json::to_value(busy_report()).unwrap();
    assert_eq!(value["issue_key"], "PROJ-42");
    assert_eq!(value["ok"], false);
    assert_eq!(value["failures"][0]["kind"], "link");
    assert_eq!(value["dedupe"]["deleted"][0], "QA-98");
    assert!(value.get("error").is_none());

    let failed = serde_json::to_value(SyncReport::failed("PROJ-1", "boom")).unwrap();
    assert_eq!(failed["error"], "boom");
    assert!(failed.get("generation_method").is_none());
}

#[test]
fn action_kind_display_matches_serde() {
    for kind in [
        ActionKind::Create,
        ActionKind::Link,
        ActionKind::Update,
        ActionKind::Label,
        ActionKind::Delete,
        ActionKind::ListLinked,
    ] {
        let json = serde_json::to_value(kind).unwrap();
        assert_eq!(json, kind.to_string());
    }
}

// ============================================================================
// Console formatters
// ============================================================================

#[test]
fn console_sync_report_lines() {
    let output = format_sync_report(&busy_report());

    assert!(output.starts_with("=== Sync: PROJ-42 (mock) ===\n\n"));
    assert!(output.contains("+ CREATE  QA-101  PROJ-42 | TC03 | Validate logout\n"));
    assert!(output.contains("~ UPDATE  QA-100  PROJ-42 | TC01 | Validate login\n"));
    assert!(output.contains("! OBSOLETE QA-99\n"));
    assert!(output.contains("    [WARN] QA-100 shadows QA-97 (Validate login)\n"));
    assert!(output.contains("- DELETE  QA-98\n"));
    assert!(output.contains("    [FAIL] delete QA-96: HTTP 503 (retryable)\n"));
    assert!(output.contains("    [FAIL] link QA-101: HTTP 400\n"));
    assert!(output.ends_with(
        "\n=== Results: 1 created, 1 updated, 1 obsolete, 1 deleted, 2 failed in 1.3s ===\n"
    ));
}

#[test]
fn console_sync_report_error() {
    let output = format_sync_report(&SyncReport::failed("PROJ-1", "scenario generation unavailable: offline"));
    assert!(output.starts_with("=== Sync: PROJ-1 (not generated) ===\n"));
    assert!(output.contains("    [ERROR] scenario generation unavailable: offline\n"));
    assert!(output.contains("0 created, 0 updated, 0 obsolete, 0 deleted, 0 failed"));
}

#[test]
fn console_dedupe_report() {
    let report = DedupeReport {
        issue_key: "PROJ-42".to_string(),
        project_key: "QA".to_string(),
        prefer: Prefer::Oldest,
        ok: true,
        error: None,
        outcome: DedupeOutcome {
            kept: vec!["QA-1".to_string(), "QA-3".to_string()],
            dropped: vec!["QA-2".to_string()],
            deleted: vec!["QA-2".to_string()],
            failures: Vec::new(),
        },
    };

    let output = format_dedupe_report(&report);
    assert_eq!(
        output,
        "=== Dedupe: PROJ-42 in QA (keep oldest) ===\n\n- DELETE  QA-2\n\n=== Results: 2 kept, 1 dropped, 1 deleted, 0 failed ===\n"
    );
}

#[test]
fn console_preview_numbers_new_tests() {
    let preview = SyncPreview {
        issue_key: "TEST-1".to_string(),
        generation_method: "ollama".to_string(),
        plan: ReconciliationPlan {
            to_create: vec![scenario("Validate a", "Given a"), scenario("Validate b", "Given b")],
            to_update: vec![PlannedUpdate {
                key: "QA-5".to_string(),
                summary: "TEST-1 | TC01 | Validate c".to_string(),
                title: "Validate c".to_string(),
                steps: "Given c".to_string(),
            }],
            obsolete: vec![existing("QA-6", "Validate d", "Given d")],
            title_collisions: Vec::new(),
        },
        next_sequence: 4,
        duplicate_drops: vec!["QA-7".to_string()],
    };

    let output = format_preview(&preview);
    assert!(output.starts_with("=== Preview: TEST-1 (ollama) ===\n\n"));
    assert!(output.contains("+ CREATE  TC04  Validate a\n+ CREATE  TC05  Validate b\n"));
    assert!(output.contains("~ UPDATE  QA-5  TEST-1 | TC01 | Validate c\n"));
    assert!(output.contains("! OBSOLETE QA-6  TEST-1 | Validate d\n"));
    assert!(output.contains("- DELETE  QA-7\n"));
    assert!(!output.contains("(nothing to do)"));
    assert!(output.ends_with("=== Plan: 2 to create, 1 to update, 1 obsolete, 1 duplicates ===\n"));
}

#[test]
fn console_preview_empty_plan() {
    let preview = SyncPreview {
        issue_key: "TEST-1".to_string(),
        generation_method: "mock".to_string(),
        plan: ReconciliationPlan::default(),
        next_sequence: 1,
        duplicate_drops: Vec::new(),
    };
    assert!(format_preview(&preview).contains("(nothing to do)\n"));
}
