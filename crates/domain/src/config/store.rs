use serde::{Deserialize, Serialize};

use super::SecretConfig;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document store (DynamoDB)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub table_name: String,
    /// AWS region.  Empty means "read `AWS_REGION` at startup".
    #[serde(default)]
    pub region: String,
    /// Endpoint override (e.g. `http://localhost:8000` for DynamoDB Local).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "d_access_key_id")]
    pub access_key_id: SecretConfig,
    #[serde(default = "d_secret_access_key")]
    pub secret_access_key: SecretConfig,
    #[serde(default = "d_session_token")]
    pub session_token: SecretConfig,
    #[serde(default = "d_15000")]
    pub timeout_ms: u64,
    /// Optional per-page item limit passed to `Scan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<u32>,
    #[serde(default)]
    pub consistent_read: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            region: String::new(),
            endpoint: None,
            access_key_id: d_access_key_id(),
            secret_access_key: d_secret_access_key(),
            session_token: d_session_token(),
            timeout_ms: 15_000,
            page_limit: None,
            consistent_read: false,
        }
    }
}

impl StoreConfig {
    /// The configured region, falling back to the `AWS_REGION` env var.
    pub fn resolved_region(&self) -> Option<String> {
        if !self.region.is_empty() {
            return Some(self.region.clone());
        }
        std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty())
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_access_key_id() -> SecretConfig {
    SecretConfig::from_env("AWS_ACCESS_KEY_ID")
}
fn d_secret_access_key() -> SecretConfig {
    SecretConfig::from_env("AWS_SECRET_ACCESS_KEY")
}
fn d_session_token() -> SecretConfig {
    SecretConfig::from_env("AWS_SESSION_TOKEN")
}
fn d_15000() -> u64 {
    15_000
}
