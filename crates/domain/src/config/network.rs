use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound network
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Proxy settings applied to every outbound HTTP client (store, generator,
/// Discord REST).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Proxy URL, e.g. `socks5h://127.0.0.1:40000`.  Takes precedence over
    /// `proxy_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Env var consulted when `proxy` is unset.  Unset or empty means a
    /// direct connection.
    #[serde(default = "d_proxy_env")]
    pub proxy_env: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            proxy_env: d_proxy_env(),
        }
    }
}

impl NetworkConfig {
    /// The effective proxy URL, if any.
    pub fn resolved_proxy(&self) -> Option<String> {
        self.proxy
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| std::env::var(&self.proxy_env).ok().filter(|p| !p.is_empty()))
    }
}

fn d_proxy_env() -> String {
    "TB_PROXY".into()
}
