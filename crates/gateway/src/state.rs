use std::sync::Arc;

use tb_domain::config::Config;

use crate::discord::{CommandCatalog, DiscordClient, SignatureVerifier};
use crate::runtime::CommandPipeline;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub pipeline: Arc<CommandPipeline>,

    // ── Discord ───────────────────────────────────────────────────────
    pub discord: Arc<DiscordClient>,
    /// Built once from the configured public key.
    pub verifier: Arc<SignatureVerifier>,
    pub catalog: Arc<CommandCatalog>,
}
