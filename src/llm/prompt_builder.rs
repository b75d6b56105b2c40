use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn commit_message_prompt(branch: &str, report: &str, context: Option<&str>) -> PromptPair {
    let mut system = prompts::COMMIT_INSTRUCTIONS.to_owned();
    if let Some(ctx) = context {
        system.push_str("\nAuthor's note about this change: ");
        system.push_str(ctx);
    }

    let user = format!(
        "Branch: {branch}\n\nRepository changes:\n\n{report}",
        branch = branch,
        report = report
    );

    PromptPair { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_appended_to_system_prompt() {
        let prompts = commit_message_prompt("feature/x", "## Staged changes\n", Some("fixes login"));
        assert!(prompts.system.ends_with("Author's note about this change: fixes login"));
        assert!(prompts.user.starts_with("Branch: feature/x\n\nRepository changes:"));
        assert!(prompts.user.contains("## Staged changes"));
    }

    #[test]
    fn no_context_keeps_base_instructions() {
        let prompts = commit_message_prompt("main", "", None);
        assert_eq!(prompts.system, prompts::COMMIT_INSTRUCTIONS);
    }
}
