//! AppState construction shared by `serve` and the one-shot CLI commands.

use std::sync::Arc;

use anyhow::Context;

use tb_domain::config::{Config, ConfigError, ConfigSeverity};
use tb_providers::create_provider;
use tb_store::{create_table_client, StoreReader};

use crate::discord::{CommandCatalog, DiscordClient, SignatureVerifier};
use crate::runtime::{AnswerGenerator, CommandPipeline, PipelineSettings};
use crate::state::AppState;

/// Log every config issue and fail on any error-severity one.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    report_issues(config.validate())
}

/// Like [`check_config`], minus the Discord and server sections.  Used by
/// the local `count`/`ask` commands.
pub fn check_pipeline_config(config: &Config) -> anyhow::Result<()> {
    report_issues(config.validate_pipeline())
}

fn report_issues(issues: Vec<ConfigError>) -> anyhow::Result<()> {
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Build the store reader, the generator and the pipeline over them.
///
/// Does not validate Discord settings, so the local `count`/`ask`
/// commands work without an application configured.
pub fn build_pipeline(config: &Config) -> anyhow::Result<Arc<CommandPipeline>> {
    // ── Store ────────────────────────────────────────────────────────
    let table = create_table_client(&config.store, &config.network)
        .context("creating DynamoDB client")?;
    let store = StoreReader::new(table);

    // ── Generator ────────────────────────────────────────────────────
    let provider =
        create_provider(&config.llm, &config.network).context("initializing LLM provider")?;
    tracing::info!(
        provider = %provider.provider_id(),
        model = %provider.default_model(),
        "LLM provider ready"
    );
    let generator = AnswerGenerator::new(provider);

    // ── Pipeline ─────────────────────────────────────────────────────
    let settings = PipelineSettings::from_config(config);
    tracing::info!(
        deadline_secs = settings.deadline.as_secs(),
        context_max_chars = settings.context_max_chars,
        message_limit = settings.message_limit,
        "command pipeline ready"
    );
    Ok(Arc::new(CommandPipeline::new(store, generator, settings)))
}

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    check_config(&config)?;

    let pipeline = build_pipeline(&config)?;

    // ── Discord ──────────────────────────────────────────────────────
    let verifier = SignatureVerifier::from_hex(&config.discord.public_key)
        .context("loading discord public key")?;
    let discord = DiscordClient::from_config(&config.discord, &config.network)
        .context("creating discord client")?;
    let catalog = CommandCatalog::from_config(&config.discord);
    tracing::info!(
        application_id = %config.discord.application_id,
        count_commands = ?config.discord.count_commands,
        ask_commands = ?config.discord.ask_commands,
        typing = discord.has_bot_token(),
        "discord interactions ready"
    );

    Ok(AppState {
        config,
        pipeline,
        discord: Arc::new(discord),
        verifier: Arc::new(verifier),
        catalog: Arc::new(catalog),
    })
}
