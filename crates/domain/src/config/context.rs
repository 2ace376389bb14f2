use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Prompt context caps
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Upper bound on the serialized record set embedded in a prompt.
    /// Records past the cap are omitted (in scan order) and the prompt says so.
    #[serde(default = "d_1000000")]
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_chars: 1_000_000,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Command pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How long Discord accepts edits to an interaction response.
pub const PLATFORM_EDIT_WINDOW_SECS: u64 = 15 * 60;

/// Longest message Discord accepts, in characters.
pub const PLATFORM_MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Budget for everything after the acknowledgment.
    #[serde(default = "d_600")]
    pub deadline_secs: u64,
    /// Hard ceiling on a single outbound message, in characters.
    #[serde(default = "d_2000")]
    pub message_limit: usize,
    /// On shutdown, how long runs already started may keep going before
    /// they are interrupted and told so.
    #[serde(default = "d_30")]
    pub shutdown_grace_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 600,
            message_limit: 2000,
            shutdown_grace_secs: 30,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_1000000() -> usize {
    1_000_000
}
fn d_600() -> u64 {
    600
}
fn d_2000() -> usize {
    2000
}
fn d_30() -> u64 {
    30
}
