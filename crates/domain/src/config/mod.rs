mod context;
mod discord;
mod llm;
mod network;
mod observability;
mod secret;
mod server;
mod store;

pub use context::*;
pub use discord::*;
pub use llm::*;
pub use network::*;
pub use observability::*;
pub use secret::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }

        if self.discord.application_id.is_empty() {
            errors.push(ConfigError::error(
                "discord.application_id",
                "application id must not be empty",
            ));
        }
        if self.discord.public_key.is_empty() {
            errors.push(ConfigError::error(
                "discord.public_key",
                "public key must not be empty (interactions cannot be verified)",
            ));
        }
        if self.discord.bot_token.is_empty() {
            errors.push(ConfigError::warning(
                "discord.bot_token",
                "no bot token configured: typing indicator and command registration disabled",
            ));
        }
        if self.discord.ask_commands.is_empty() && self.discord.count_commands.is_empty() {
            errors.push(ConfigError::error("discord", "no commands configured"));
        }
        for name in &self.discord.count_commands {
            if self.discord.ask_commands.contains(name) {
                errors.push(ConfigError::error(
                    "discord.count_commands",
                    format!("command '{name}' is also listed in ask_commands"),
                ));
            }
        }

        errors.extend(self.validate_pipeline());
        errors
    }

    /// The subset of [`validate`](Self::validate) that covers what a run
    /// needs (store, model, context and pipeline bounds) and nothing about
    /// serving interactions.
    pub fn validate_pipeline(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.store.table_name.is_empty() {
            errors.push(ConfigError::error("store.table_name", "table name must not be empty"));
        }
        if self.store.resolved_region().is_none() && self.store.endpoint.is_none() {
            errors.push(ConfigError::error(
                "store.region",
                "region must be set (or AWS_REGION exported)",
            ));
        }

        if self.llm.base_url.is_empty() {
            errors.push(ConfigError::error("llm.base_url", "base_url must not be empty"));
        }
        if self.llm.model.is_empty() {
            errors.push(ConfigError::error("llm.model", "model must not be empty"));
        }

        if self.context.max_chars == 0 {
            errors.push(ConfigError::error(
                "context.max_chars",
                "max_chars must be greater than 0",
            ));
        }

        if self.pipeline.deadline_secs == 0 {
            errors.push(ConfigError::error(
                "pipeline.deadline_secs",
                "deadline must be greater than 0",
            ));
        } else if self.pipeline.deadline_secs > PLATFORM_EDIT_WINDOW_SECS {
            errors.push(ConfigError::error(
                "pipeline.deadline_secs",
                format!(
                    "deadline exceeds the platform's {PLATFORM_EDIT_WINDOW_SECS}s edit window"
                ),
            ));
        }
        if self.pipeline.message_limit < 100 {
            errors.push(ConfigError::error(
                "pipeline.message_limit",
                "message limit must be at least 100 characters",
            ));
        } else if self.pipeline.message_limit > PLATFORM_MESSAGE_LIMIT {
            errors.push(ConfigError::error(
                "pipeline.message_limit",
                format!("message limit exceeds the platform's {PLATFORM_MESSAGE_LIMIT}-character maximum"),
            ));
        }

        errors
    }
}
