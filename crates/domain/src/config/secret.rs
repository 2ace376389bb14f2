use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Secret references
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where to find a credential.  Resolved by [`crate::secret::resolve_secret`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SecretConfig {
    /// Env var containing the secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Direct value (for config-only setups; prefer env or keychain).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Keychain service name (e.g. "tablebot").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Keychain account name (e.g. "gemini-api-key").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl SecretConfig {
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            env: Some(var.into()),
            ..Default::default()
        }
    }

    /// True when no source at all is configured.
    pub fn is_empty(&self) -> bool {
        self.env.is_none() && self.key.is_none() && self.service.is_none() && self.account.is_none()
    }
}
