use serde::Deserialize;
use serde_json::Value;

use crate::feature::ScenarioRecord;

#[derive(Deserialize)]
struct ScenarioList {
    #[serde(default)]
    scenarios: Vec<RawScenario>,
}

#[derive(Deserialize)]
struct RawScenario {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    steps: Option<Value>,
}

/// First balanced `{...}` object in `text`, if any.
///
/// Braces inside JSON strings are not special-cased.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;

    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn steps_text(steps: Option<Value>) -> String {
    match steps {
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Parse `{"scenarios": [{"title", "steps"}]}` out of a model response.
///
/// Falls back to the first embedded JSON object when the whole text is not
/// JSON. Entries without steps are skipped and at most `max_count` are kept.
/// The error is a human-readable reason.
pub fn parse_scenarios(raw: &str, max_count: usize) -> Result<Vec<ScenarioRecord>, String> {
    if raw.trim().is_empty() {
        return Err("response contained no text".to_string());
    }

    let list: ScenarioList = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(_) => {
            let candidate = extract_first_json_object(raw).ok_or_else(|| {
                format!(
                    "response was not valid JSON: {}...",
                    raw.chars().take(200).collect::<String>()
                )
            })?;
            serde_json::from_str(candidate)
                .map_err(|e| format!("embedded JSON object is invalid: {}", e))?
        }
    };

    if list.scenarios.is_empty() {
        return Err("response JSON has no 'scenarios'".to_string());
    }

    let scenarios: Vec<ScenarioRecord> = list
        .scenarios
        .into_iter()
        .take(max_count)
        .filter_map(|raw| {
            let title = raw.title.unwrap_or_default();
            let title = match title.trim() {
                "" => "Untitled".to_string(),
                t => t.to_string(),
            };
            let steps = steps_text(raw.steps);
            (!steps.trim().is_empty()).then(|| ScenarioRecord::new(title, steps))
        })
        .collect();

    if scenarios.is_empty() {
        return Err("no usable scenarios in response".to_string());
    }
    Ok(scenarios)
}
