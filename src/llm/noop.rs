use anyhow::Result;

use super::LlmClient;

/// No-op / dummy model client for development with --no-model or model=none.
pub struct NoopClient;

impl LlmClient for NoopClient {
    fn generate_commit_message(
        &self,
        branch: &str,
        report: &str,
        context: Option<&str>,
    ) -> Result<String> {
        let mut msg = format!("Dummy commit message for branch {branch}\n\n");
        if let Some(ctx) = context {
            msg.push_str(&format!("Context: {ctx}\n"));
        }
        msg.push_str(&format!(
            "(LLM disabled; report was {} chars)",
            report.chars().count()
        ));
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_message_mentions_branch_and_context() {
        let msg = NoopClient
            .generate_commit_message("main", "diff", Some("ticket 42"))
            .unwrap();
        assert!(msg.starts_with("Dummy commit message for branch main"));
        assert!(msg.contains("Context: ticket 42"));
        assert!(msg.contains("report was 4 chars"));
    }
}
