use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{AppError, AppResult};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Text-completion client for the external model service. Built once at
/// startup and injected through `AppState`; the model is a black box that
/// may be slow or return malformed output, so calls carry a 30-second
/// timeout and failures map to `UpstreamUnavailable`.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            api_key: config.claude_api_key.clone(),
            model: config.claude_model.clone(),
        }
    }

    /// Send a prompt, return the model's raw text response.
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "messages": [{
                    "role": "user",
                    "content": prompt
                }]
            }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Model API returned an error");
            return Err(AppError::UpstreamUnavailable(format!(
                "model API error {}: {}",
                status, body
            )));
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        envelope["content"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| {
                AppError::UpstreamFormat("response contained no text content".into())
            })
    }
}

/// Locate the fenced ```json block in a model response and return its body.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    let (_, after) = text.split_once("```json")?;
    let (block, _) = after.split_once("```")?;
    Some(block.trim())
}

/// Extract and decode the fenced JSON block into `T`. A missing block or a
/// decode failure is `UpstreamFormat`: the model replied, but the content is
/// unusable, and the request fails without an internal retry.
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    let block = extract_fenced_json(text).ok_or_else(|| {
        AppError::UpstreamFormat("response has no fenced JSON block".into())
    })?;
    serde_json::from_str(block)
        .map_err(|e| AppError::UpstreamFormat(format!("fenced JSON failed to decode: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── fenced block extraction ──────────────────────────────────────────

    #[test]
    fn test_extract_fenced_json_happy_path() {
        let text = "Here is your analysis:\n```json\n{\"a\": 1}\n```\nHope it helps!";
        assert_eq!(extract_fenced_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_fenced_json_missing_fence() {
        assert_eq!(extract_fenced_json("{\"a\": 1}"), None);
    }

    #[test]
    fn test_extract_fenced_json_unterminated_fence() {
        assert_eq!(extract_fenced_json("```json\n{\"a\": 1}"), None);
    }

    #[test]
    fn test_parse_fenced_json_decodes() {
        #[derive(serde::Deserialize)]
        struct Payload {
            a: i32,
        }
        let parsed: Payload = parse_fenced_json("```json\n{\"a\": 41}\n```").unwrap();
        assert_eq!(parsed.a, 41);
    }

    #[test]
    fn test_parse_fenced_json_maps_to_upstream_format() {
        let missing = parse_fenced_json::<serde_json::Value>("no fence here");
        assert!(matches!(missing, Err(AppError::UpstreamFormat(_))));

        let malformed = parse_fenced_json::<serde_json::Value>("```json\n{not json}\n```");
        assert!(matches!(malformed, Err(AppError::UpstreamFormat(_))));
    }

    #[test]
    fn test_parse_fenced_json_takes_first_block() {
        let text = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        let parsed: serde_json::Value = parse_fenced_json(text).unwrap();
        assert_eq!(parsed["first"], true);
    }
}
