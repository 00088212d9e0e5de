use crate::tracker::IssueComment;

const NOISE_COMMENTS: &[&str] = &[
    "listo",
    "hecho",
    "done",
    "ok",
    "gracias",
    "de acuerdo",
    "thanks",
];
const MIN_COMMENT_WORDS: usize = 3;
const TRUNCATION_MARKER: &str = "\n\n[...truncated...]";

/// Limits applied while building the generation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub max_context_chars: usize,
    pub max_comments: usize,
    pub max_comment_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_context_chars: 16_000,
            max_comments: 10,
            max_comment_chars: 600,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> Option<String> {
    text.char_indices()
        .nth(max)
        .map(|(byte, _)| text[..byte].to_string())
}

/// Bullet list of the first `max_comments` comments that say something.
///
/// Comments under three words or equal to an acknowledgement are dropped;
/// long bodies are cut with ` [...]`.
pub fn format_comments(comments: &[IssueComment], limits: &ContextLimits) -> String {
    if comments.is_empty() {
        return "No additional comments.".to_string();
    }

    let formatted: Vec<String> = comments
        .iter()
        .take(limits.max_comments)
        .filter_map(|c| {
            let body = c.body.trim();
            if body.split_whitespace().count() < MIN_COMMENT_WORDS
                || NOISE_COMMENTS.contains(&body.to_lowercase().as_str())
            {
                return None;
            }
            let body = match truncate_chars(body, limits.max_comment_chars) {
                Some(cut) => format!("{} [...]", cut.trim_end()),
                None => body.to_string(),
            };
            Some(format!("- Comment from {}: {}", c.author, body))
        })
        .collect();

    if formatted.is_empty() {
        "No relevant comments found.".to_string()
    } else {
        formatted.join("\n")
    }
}

/// Description plus filtered comments, capped at `max_context_chars`.
pub fn build_context(
    description: &str,
    comments: &[IssueComment],
    limits: &ContextLimits,
) -> String {
    let context = format!(
        "**USER STORY DESCRIPTION:**\n{}\n\n**ADDITIONAL COMMENTS & CLARIFICATIONS:**\n{}",
        description,
        format_comments(comments, limits)
    );

    match truncate_chars(&context, limits.max_context_chars) {
        Some(cut) => {
            tracing::info!(max = limits.max_context_chars, "context truncated");
            format!("{}{}", cut, TRUNCATION_MARKER)
        }
        None => context,
    }
}
