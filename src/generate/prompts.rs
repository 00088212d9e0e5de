/// System prompt for UI / BDD stories.
pub const UI_SCENARIOS_PROMPT: &str = "You are a highly experienced Senior QA Analyst. Your task is to analyze the full context of a user story and create a comprehensive set of test cases. You must be rigorous and cover all requirements provided.

YOUR RULES:
1. HOLISTIC ANALYSIS: The context may contain several sections such as 'Scenarios', 'Copys' and 'Amplitude'. Treat every section as a source of requirements and create test cases for ALL of them.
2. GHERKIN (ENGLISH): All test cases must be written in Gherkin format, in English, from a third-person perspective.
3. REQUIREMENT-DRIVEN TESTS:
   - For each 'Scenario' in the context, create a detailed Gherkin test case that validates it.
   - For a 'Copys' table, create ONLY TWO consolidated test cases: one for all Spanish texts and one for all English texts.
   - For each 'Amplitude' event, create a test case verifying the event is triggered correctly.
4. BE SPECIFIC: Use concrete actions and verifiable outcomes. Avoid generic steps.
5. TITLES: Every scenario title must start with 'Validate' and be descriptive. Do not just copy the scenario title from the context.
6. STRICT JSON OUTPUT: Output a SINGLE valid JSON object with one key, `scenarios`, holding a list of objects with a `title` (string) and `steps` (one string, steps separated by newlines).";

/// System prompt for backend / API work.
pub const API_TESTS_PROMPT: &str = "You are a meticulous QA Engineer specializing in backend and API testing. Your task is to analyze technical requirements and create specific API test cases.

YOUR RULES:
1. ANALYZE TECHNICAL DETAILS: Focus on changes to services, endpoints, request bodies and data structures. If Gherkin scenarios are provided, adopt them directly. Ignore UI/UX aspects.
2. API GHERKIN: Write scenarios in Gherkin format that describe API interactions.
3. VALIDATE CONTRACTS: Create tests for changes such as added or deprecated fields.
4. NEGATIVE PATHS: Create tests for potential errors.
5. STRICT JSON OUTPUT: Output a SINGLE valid JSON object with one key, `scenarios`, holding a list of objects with `title` and `steps`.";

/// Kind of work a ticket describes; selects the prompt and extra labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Ui,
    Backend,
}

impl TaskKind {
    pub fn system_prompt(self) -> &'static str {
        match self {
            TaskKind::Ui => UI_SCENARIOS_PROMPT,
            TaskKind::Backend => API_TESTS_PROMPT,
        }
    }

    /// Labels added to generated tests on top of the base labels.
    pub fn extra_labels(self) -> &'static [&'static str] {
        match self {
            TaskKind::Ui => &[],
            TaskKind::Backend => &["api-test"],
        }
    }
}

/// Backend when the summary carries `[BE]` or the labels say backend
/// without also saying frontend.
pub fn classify_task(summary: &str, labels: &[String]) -> TaskKind {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let has = |name: &str| labels.iter().any(|l| l == name);

    if summary.to_lowercase().contains("[be]") || (has("backend") && !has("frontend")) {
        TaskKind::Backend
    } else {
        TaskKind::Ui
    }
}
