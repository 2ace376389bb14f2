//! Provider construction from configuration.

use std::sync::Arc;

use tb_domain::config::{LlmConfig, NetworkConfig, ProviderKind};
use tb_domain::error::Result;

use crate::google::GoogleProvider;
use crate::traits::LlmProvider;

/// Instantiate the adapter selected by `cfg.kind`.
///
/// The API key is resolved eagerly, so a missing key fails at startup.
pub fn create_provider(cfg: &LlmConfig, network: &NetworkConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match cfg.kind {
        ProviderKind::Google => Arc::new(GoogleProvider::from_config(cfg, network)?),
    };
    tracing::info!(
        provider_id = %cfg.id,
        kind = ?cfg.kind,
        model = %provider.default_model(),
        "registered LLM provider"
    );
    Ok(provider)
}
