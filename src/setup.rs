use anyhow::{Result, anyhow};
use log::debug;

use crate::config::{CommitConfig, Provider};
use crate::llm::LlmClient;
use crate::llm::noop::NoopClient;
use crate::llm::ollama::OllamaClient;
use crate::llm::openai::OpenAiClient;

/// Build the LLM client based on CLI + config.
pub fn build_llm_client(cfg: &CommitConfig) -> Result<Box<dyn LlmClient>> {
    if cfg.no_model {
        debug!("Using NoopClient (no model calls)");
        return Ok(Box::new(NoopClient));
    }

    match cfg.provider {
        Provider::Openai => {
            let key = cfg.openai_api_key.clone().ok_or_else(|| {
                anyhow!(
                    "OPENAI_API_KEY (or --api-key) is required unless --no-model or model=none is used"
                )
            })?;
            debug!("Using OpenAiClient with model: {}", cfg.model);
            Ok(Box::new(OpenAiClient::new(
                key,
                cfg.model.clone(),
                &cfg.api_base_url,
                cfg.stream,
            )?))
        }
        Provider::Ollama => {
            debug!("Using OllamaClient with model: {} at {}", cfg.model, cfg.ollama_url);
            Ok(Box::new(OllamaClient::new(
                cfg.ollama_url.clone(),
                cfg.model.clone(),
                cfg.stream,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff_report::DiffLimits;

    fn config(provider: Provider, key: Option<&str>, no_model: bool) -> CommitConfig {
        CommitConfig {
            provider,
            model: "test-model".into(),
            no_model,
            openai_api_key: key.map(str::to_string),
            api_base_url: "https://example.test".into(),
            ollama_url: "http://localhost:11434".into(),
            stream: false,
            limits: DiffLimits::default(),
        }
    }

    #[test]
    fn openai_without_key_is_an_error() {
        let err = build_llm_client(&config(Provider::Openai, None, false))
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn no_model_needs_no_key() {
        let client = build_llm_client(&config(Provider::Openai, None, true)).unwrap();
        let msg = client.generate_commit_message("main", "", None).unwrap();
        assert!(msg.starts_with("Dummy commit message"));
    }

    #[test]
    fn ollama_needs_no_key() {
        assert!(build_llm_client(&config(Provider::Ollama, None, false)).is_ok());
    }
}
