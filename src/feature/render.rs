use crate::text::{PLACEHOLDER_TITLE, TITLE_MARKER};

use super::scenario::ScenarioRecord;

const SCENARIO_KEYWORD: &str = "Scenario:";

/// Render a single-scenario feature file:
///
/// ```text
/// @PROJ-1
/// Feature: Login story
///   # Source: PROJ-1
///
///   Scenario: successful login
///     Given ...
/// ```
///
/// The leading `Validate ` of the title is dropped once.
pub fn render_feature(summary: &str, context_key: &str, scenario: &ScenarioRecord) -> String {
    let title = if scenario.title.trim().is_empty() {
        PLACEHOLDER_TITLE
    } else {
        scenario.title.as_str()
    };
    let marker = format!("{} ", TITLE_MARKER);
    let scenario_title = title.strip_prefix(&marker).unwrap_or(title);

    let mut lines = vec![
        format!("@{}", context_key),
        format!("Feature: {}", summary),
        format!("  # Source: {}", context_key),
        String::new(),
        format!("  Scenario: {}", scenario_title),
    ];

    for step in scenario.steps.lines() {
        lines.push(format!("    {}", step.trim()));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Recover the step lines from stored feature text.
///
/// For a rendered feature this is everything after the first `Scenario:`
/// line. Plain step text is returned as-is, line-trimmed. Blank lines are dropped.
pub fn scenario_steps(feature_text: &str) -> String {
    let lines: Vec<&str> = feature_text.lines().map(str::trim).collect();

    let start = lines
        .iter()
        .position(|l| l.starts_with(SCENARIO_KEYWORD))
        .map_or(0, |i| i + 1);

    lines[start..]
        .iter()
        .filter(|l| !l.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}
