pub mod noop;
pub mod ollama;
pub mod openai;
mod prompt_builder;
mod prompts;
mod stream;

use anyhow::{Result, anyhow};

/// Trait for talking to an LLM backend.
pub trait LlmClient: Send + Sync {
    /// Generate a commit message from a bounded diff report.
    fn generate_commit_message(
        &self,
        branch: &str,
        report: &str,
        context: Option<&str>,
    ) -> Result<String>;
}

/// Strip surrounding whitespace and a wrapping code fence from model output.
pub fn clean_message(raw: &str) -> Result<String> {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string, e.g. ```text
        let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        text = rest.trim_end().strip_suffix("```").unwrap_or(rest).trim();
    }

    if text.is_empty() {
        return Err(anyhow!("model returned an empty commit message"));
    }

    Ok(text.to_string())
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...\n[truncated {} bytes]", &s[..cut], s.len() - cut),
    }
}
