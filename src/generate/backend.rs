use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::feature::ScenarioRecord;

use super::parse::parse_scenarios;

/// Everything a generator needs to propose scenarios for one ticket.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub context_key: &'a str,
    pub summary: &'a str,
    pub context_text: &'a str,
    pub max_count: usize,
    pub system_prompt: &'a str,
}

/// Result of a generation call. `Unavailable` is a soft failure: no
/// candidates, with a reason, and no error raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Generated {
        scenarios: Vec<ScenarioRecord>,
        method: String,
    },
    Unavailable {
        reason: String,
    },
}

impl GenerationOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        GenerationOutcome::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn scenarios(&self) -> &[ScenarioRecord] {
        match self {
            GenerationOutcome::Generated { scenarios, .. } => scenarios,
            GenerationOutcome::Unavailable { .. } => &[],
        }
    }
}

pub trait ScenarioGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> GenerationOutcome;
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub struct OllamaGenerator {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            temperature: 0.2,
            max_output_tokens: 2048,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    system: &'a str,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaGenerator {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            ..Self::default()
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(request: &GenerationRequest<'_>) -> String {
        format!(
            "--- START OF ISSUE CONTEXT ---\n**USER STORY SUMMARY:** {}\n\n{}\n--- END OF ISSUE CONTEXT ---\n\nReturn at most {} scenarios.",
            request.summary, request.context_text, request.max_count
        )
    }

    fn call(&self, request: &GenerationRequest<'_>) -> Result<String, String> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: Self::build_prompt(request),
            system: request.system_prompt,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_output_tokens,
            },
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| format!("could not build HTTP client: {}", e))?;

        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    "generation call timed out".to_string()
                } else {
                    format!("generation call failed: {}", e)
                }
            })?;

        if !response.status().is_success() {
            return Err(format!("generation endpoint answered {}", response.status()));
        }

        let parsed: OllamaResponse = response
            .json()
            .map_err(|e| format!("unreadable generation response: {}", e))?;
        Ok(parsed.response)
    }
}

impl ScenarioGenerator for OllamaGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> GenerationOutcome {
        info!(
            key = request.context_key,
            model = %self.model,
            context_chars = request.context_text.len(),
            "requesting scenarios"
        );

        let started = Instant::now();
        let raw = match self.call(request) {
            Ok(raw) => raw,
            Err(reason) => {
                error!(key = request.context_key, %reason, "generation unavailable");
                return GenerationOutcome::unavailable(reason);
            }
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            preview = %raw.chars().take(500).collect::<String>(),
            "generation response received"
        );

        match parse_scenarios(&raw, request.max_count) {
            Ok(scenarios) => {
                info!(count = scenarios.len(), "scenarios generated");
                GenerationOutcome::Generated {
                    scenarios,
                    method: format!("ollama:{}", self.model),
                }
            }
            Err(reason) => {
                warn!(key = request.context_key, %reason, "generation response unusable");
                GenerationOutcome::unavailable(reason)
            }
        }
    }
}

// ============================================================================
// Mock Backend (for testing without a model)
// ============================================================================

/// Returns a fixed scenario list, truncated to `max_count`.
pub struct MockGenerator {
    pub scenarios: Vec<ScenarioRecord>,
}

impl MockGenerator {
    pub fn new(scenarios: Vec<ScenarioRecord>) -> Self {
        Self { scenarios }
    }

    /// Canned happy-path and negative-path login scenarios.
    pub fn sample() -> Self {
        Self::new(vec![
            ScenarioRecord::new(
                "Validate successful login",
                "Given a registered user on the login page\nWhen the user submits valid credentials\nThen the dashboard is shown",
            ),
            ScenarioRecord::new(
                "Validate login with wrong password",
                "Given a registered user on the login page\nWhen the user submits a wrong password\nThen an error message is shown",
            ),
        ])
    }
}

impl ScenarioGenerator for MockGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> GenerationOutcome {
        if self.scenarios.is_empty() {
            return GenerationOutcome::unavailable("mock generator has no scenarios");
        }
        GenerationOutcome::Generated {
            scenarios: self.scenarios.iter().take(request.max_count).cloned().collect(),
            method: "mock".to_string(),
        }
    }
}
