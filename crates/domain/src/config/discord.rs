use serde::{Deserialize, Serialize};

use super::SecretConfig;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Discord application
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Application (client) id.  Used for follow-up edits and registration.
    #[serde(default)]
    pub application_id: String,
    /// Hex-encoded Ed25519 public key from the developer portal.
    #[serde(default)]
    pub public_key: String,
    /// Bot token.  Only needed for the typing indicator and command
    /// registration; interaction edits authenticate with the interaction token.
    #[serde(default = "d_bot_token")]
    pub bot_token: SecretConfig,
    #[serde(default = "d_api_base")]
    pub api_base_url: String,
    /// Register commands in this guild only (instant) instead of globally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    /// Command names answered with the approximate row count.
    #[serde(default = "d_count_commands")]
    pub count_commands: Vec<String>,
    /// Command names answered by the model; the first is the primary name,
    /// the rest are aliases.
    #[serde(default = "d_ask_commands")]
    pub ask_commands: Vec<String>,
    /// Name of the free-text option carrying the question.
    #[serde(default = "d_question_option")]
    pub question_option: String,
    /// How often the typing indicator is re-triggered while a question runs.
    #[serde(default = "d_8")]
    pub working_interval_secs: u64,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            public_key: String::new(),
            bot_token: d_bot_token(),
            api_base_url: d_api_base(),
            guild_id: None,
            count_commands: d_count_commands(),
            ask_commands: d_ask_commands(),
            question_option: d_question_option(),
            working_interval_secs: 8,
            timeout_ms: 10_000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_bot_token() -> SecretConfig {
    SecretConfig::from_env("DISCORD_TOKEN")
}
fn d_api_base() -> String {
    "https://discord.com/api/v10".into()
}
fn d_count_commands() -> Vec<String> {
    vec!["hello".into()]
}
fn d_ask_commands() -> Vec<String> {
    vec!["ai".into(), "ask".into(), "chat".into()]
}
fn d_question_option() -> String {
    "prompt".into()
}
fn d_8() -> u64 {
    8
}
fn d_10000() -> u64 {
    10_000
}
