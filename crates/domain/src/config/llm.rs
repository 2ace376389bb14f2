use serde::{Deserialize, Serialize};

use super::SecretConfig;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Text generation provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Identifier used in logs and error messages.
    #[serde(default = "d_id")]
    pub id: String,
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_api_key")]
    pub api_key: SecretConfig,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
    /// Sampling temperature.  `None` lets the provider choose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output token cap.  `None` lets the provider choose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            id: d_id(),
            kind: ProviderKind::Google,
            base_url: d_base_url(),
            model: d_model(),
            api_key: d_api_key(),
            timeout_ms: 120_000,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Google,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_id() -> String {
    "gemini".into()
}
fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_model() -> String {
    "gemini-2.5-flash".into()
}
fn d_api_key() -> SecretConfig {
    SecretConfig::from_env("GEMINI_API_KEY")
}
fn d_120000() -> u64 {
    120_000
}
