//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API.
//! Auth is via an API key passed as a query parameter (`key={api_key}`).

use std::time::Duration;

use serde_json::Value;
use tb_domain::config::{LlmConfig, NetworkConfig};
use tb_domain::error::{Error, Result};
use tb_domain::net::{from_reqwest, http_client};
use tb_domain::secret::resolve_secret;

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for the Google Gemini API.
pub struct GoogleProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new provider from the `[llm]` config section.
    pub fn from_config(cfg: &LlmConfig, network: &NetworkConfig) -> Result<Self> {
        let api_key = resolve_secret(&cfg.api_key)?;
        let client = http_client(Duration::from_millis(cfg.timeout_ms), network)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    fn build_body(&self, req: &ChatRequest) -> Value {
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": req.prompt}],
            }],
        });

        let mut gen_config = serde_json::json!({});
        if let Some(temp) = self.temperature {
            gen_config["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = self.max_output_tokens {
            gen_config["maxOutputTokens"] = serde_json::json!(max);
        }
        if gen_config.as_object().is_some_and(|o| !o.is_empty()) {
            body["generationConfig"] = gen_config;
        }

        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_gemini_response(provider: &str, body: &Value, model: &str) -> Result<ChatResponse> {
    let provider_err = |message: String| Error::Provider {
        provider: provider.to_string(),
        message,
    };

    let candidate = match body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    {
        Some(c) => c,
        None => {
            let reason = body
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str());
            return Err(provider_err(match reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "no candidates in response".into(),
            }));
        }
    };

    let mut text_content = String::new();
    if let Some(parts) = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in parts {
            if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                text_content.push_str(text);
            }
        }
    }

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|v| v.as_str())
        .map(|s| match s {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            other => other.to_lowercase(),
        });

    let usage = body.get("usageMetadata").and_then(parse_gemini_usage);

    Ok(ChatResponse {
        content: text_content,
        usage,
        model: model.to_string(),
        finish_reason,
    })
}

fn parse_gemini_usage(v: &Value) -> Option<Usage> {
    let prompt = v.get("promptTokenCount")?.as_u64()? as u32;
    let completion = v
        .get("candidatesTokenCount")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;
    let total = v
        .get("totalTokenCount")
        .and_then(|v| v.as_u64())
        .unwrap_or((prompt + completion) as u64) as u32;
    Some(Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    })
}

/// Render a non-2xx Gemini response as an error message.
///
/// Gemini errors look like `{"error": {"code", "message", "status"}}`; the
/// raw body is used when it does not.
fn gemini_error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let err = parsed.as_ref().and_then(|v| v.get("error"));
    let message = err.and_then(|e| e.get("message")).and_then(|m| m.as_str());
    let kind = err.and_then(|e| e.get("status")).and_then(|s| s.as_str());

    match (kind, message) {
        (Some(kind), Some(message)) => format!("HTTP {status} {kind} - {message}"),
        (None, Some(message)) => format!("HTTP {status} - {message}"),
        _ => format!("HTTP {status} - {}", body.trim()),
    }
}

/// Redact API key from URL for safe logging.
fn redact_url_key(url: &str) -> String {
    if let Some(idx) = url.find("key=") {
        let prefix = &url[..idx + 4];
        let rest = &url[idx + 4..];
        let end = rest.find('&').unwrap_or(rest.len());
        format!("{prefix}[REDACTED]{}", &rest[end..])
    } else {
        url.to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for GoogleProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let model = self.default_model.as_str();
        let url = self.generate_url(model);
        let body = self.build_body(req);

        tracing::debug!(
            provider = %self.id,
            url = %redact_url_key(&url),
            prompt_chars = req.prompt.chars().count(),
            "google chat request"
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| redact_error(from_reqwest(e), &self.api_key))?;

        let status = resp.status();
        let resp_text = resp
            .text()
            .await
            .map_err(|e| redact_error(from_reqwest(e), &self.api_key))?;

        if !status.is_success() {
            let message = gemini_error_message(status.as_u16(), &resp_text);
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(Error::Auth(format!("{}: {message}", self.id)));
            }
            return Err(Error::Provider {
                provider: self.id.clone(),
                message,
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        let response = parse_gemini_response(&self.id, &resp_json, model)?;

        tracing::debug!(
            provider = %self.id,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.map(|u| u.total_tokens),
            "google chat response"
        );
        Ok(response)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

/// reqwest includes the request URL in transport errors; strip the key.
fn redact_error(err: Error, api_key: &str) -> Error {
    if api_key.is_empty() {
        return err;
    }
    match err {
        Error::Http(msg) => Error::Http(msg.replace(api_key, "[REDACTED]")),
        Error::Timeout(msg) => Error::Timeout(msg.replace(api_key, "[REDACTED]")),
        other => other,
    }
}
