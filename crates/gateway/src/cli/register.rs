use anyhow::Context;
use tb_domain::config::Config;

use crate::discord::{CommandCatalog, DiscordClient};

/// Bulk-overwrite the application's slash commands with the configured set.
pub async fn register(config: &Config) -> anyhow::Result<()> {
    if config.discord.application_id.is_empty() {
        anyhow::bail!("discord.application_id is not set");
    }
    let client = DiscordClient::from_config(&config.discord, &config.network)?;
    let payload = CommandCatalog::from_config(&config.discord).registration_payload();
    let guild = config.discord.guild_id.as_deref();

    let registered = client
        .bulk_overwrite_commands(guild, &payload)
        .await
        .context("registering commands")?;

    match guild {
        Some(guild) => println!("Registered {registered} command(s) in guild {guild}."),
        None => println!(
            "Registered {registered} global command(s). They may take up to an hour to appear."
        ),
    }
    Ok(())
}
