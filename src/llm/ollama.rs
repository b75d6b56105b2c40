use anyhow::{Result, anyhow};
use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;
use std::io::{self, BufReader};
use std::time::Duration;

use super::stream::read_stream_to_string;
use super::{LlmClient, prompt_builder, truncate};

pub const DEFAULT_URL: &str = "http://localhost:11434";

#[derive(Debug, Encode, Decode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Encode, Decode)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Decode)]
struct OllamaStreamResponse {
    message: Option<OllamaMessage>,
    done: Option<bool>,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    stream: bool,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, stream: bool) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| anyhow!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            stream,
        })
    }

    /// Internal helper to talk to /api/chat.
    fn chat(&self, system_prompt: String, user_prompt: String) -> Result<String> {
        #[derive(Debug, Encode)]
        struct ChatRequest {
            model: String,
            stream: bool,
            messages: Vec<OllamaMessage>,
        }

        let req_body = ChatRequest {
            model: self.model.clone(),
            stream: self.stream,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: system_prompt,
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: user_prompt,
                },
            ],
        };

        let body_str = json::to_string(&req_body)
            .map_err(|e| anyhow!("Failed to encode Ollama JSON request: {e}"))?;

        log::trace!("Ollama request body: {}", truncate(&body_str, 3000));

        let url = format!("{}/api/chat", self.base_url);
        log::info!("Calling Ollama model {:?} at {url}", self.model);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| anyhow!("Error calling Ollama at {url}: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "Ollama API error: HTTP {} - {}",
                status.as_u16(),
                text
            ));
        }

        if self.stream {
            let reader = BufReader::new(resp);
            return read_stream_to_string(reader, &mut io::stdout(), parse_stream_line);
        }

        let resp_text = resp
            .text()
            .map_err(|e| anyhow!("Failed to read Ollama response body: {e}"))?;

        log::trace!("Ollama raw JSON response: {resp_text}");

        parse_response(&resp_text)
    }
}

fn parse_response(text: &str) -> Result<String> {
    let parsed: OllamaChatResponse =
        json::from_str(text).map_err(|e| anyhow!("Failed to decode Ollama JSON: {e}"))?;
    Ok(parsed.message.content.trim().to_string())
}

fn parse_stream_line(line: &str) -> Result<Option<String>> {
    let parsed: OllamaStreamResponse =
        json::from_str(line).map_err(|e| anyhow!("Failed to decode Ollama stream JSON: {e}"))?;

    if parsed.done.unwrap_or(false) {
        return Ok(None);
    }

    let content = parsed
        .message
        .and_then(|m| if m.content.is_empty() { None } else { Some(m.content) });

    Ok(content)
}

impl LlmClient for OllamaClient {
    fn generate_commit_message(
        &self,
        branch: &str,
        report: &str,
        context: Option<&str>,
    ) -> Result<String> {
        let prompts = prompt_builder::commit_message_prompt(branch, report, context);
        self.chat(prompts.system, prompts.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_content_is_trimmed() {
        let text = r#"{"message":{"role":"assistant","content":"  Add theme installer\n"}}"#;
        assert_eq!(parse_response(text).unwrap(), "Add theme installer");
    }

    #[test]
    fn stream_line_yields_content_until_done() {
        let chunk = r#"{"message":{"role":"assistant","content":"Fix"},"done":false}"#;
        assert_eq!(parse_stream_line(chunk).unwrap(), Some("Fix".to_string()));

        let done = r#"{"message":{"role":"assistant","content":""},"done":true}"#;
        assert_eq!(parse_stream_line(done).unwrap(), None);
    }
}
