//! Discord REST calls made outside the interaction response: the terminal
//! edit, the typing indicator, and command registration.

use std::time::Duration;

use serde_json::Value;
use tb_domain::config::{DiscordConfig, NetworkConfig};
use tb_domain::error::{Error, Result};
use tb_domain::net::{from_reqwest, http_client};
use tb_domain::secret::resolve_optional_secret;

use super::interaction::MessageData;

/// Attempts for one terminal edit.  Only delivery failures are retried
/// (`404` before Discord has recorded the acknowledgment, `429`, `5xx`).
const EDIT_ATTEMPTS: u32 = 4;
const EDIT_BACKOFF: Duration = Duration::from_millis(250);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DiscordClient {
    api_base: String,
    application_id: String,
    bot_token: Option<String>,
    client: reqwest::Client,
}

impl DiscordClient {
    pub fn from_config(cfg: &DiscordConfig, network: &NetworkConfig) -> Result<Self> {
        let client = http_client(Duration::from_millis(cfg.timeout_ms), network)?;
        let bot_token = resolve_optional_secret(&cfg.bot_token);
        if bot_token.is_none() {
            tracing::warn!("no discord bot token: typing indicator and registration disabled");
        }
        Ok(Self {
            api_base: cfg.api_base_url.trim_end_matches('/').to_string(),
            application_id: cfg.application_id.clone(),
            bot_token,
            client,
        })
    }

    pub fn has_bot_token(&self) -> bool {
        self.bot_token.is_some()
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Replace the content of the interaction's original response.
    ///
    /// Authenticated by the interaction token alone; no bot token needed.
    pub async fn edit_original(&self, interaction_token: &str, content: &str) -> Result<()> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, self.application_id, interaction_token
        );
        let body = MessageData::content(content);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let resp = self
                .client
                .patch(&url)
                .json(&body)
                .send()
                .await
                .map_err(from_reqwest)?;

            let status = resp.status();
            if status.is_success() {
                tracing::debug!(attempt, chars = content.chars().count(), "original response edited");
                return Ok(());
            }

            let text = resp.text().await.unwrap_or_default();
            let retryable = status.as_u16() == 404
                || status.as_u16() == 429
                || status.is_server_error();
            if !retryable || attempt >= EDIT_ATTEMPTS {
                return Err(Error::Discord(discord_error_message(status.as_u16(), &text)));
            }

            let delay = if status.as_u16() == 429 {
                retry_after(&text).unwrap_or(EDIT_BACKOFF).min(MAX_RETRY_AFTER)
            } else {
                EDIT_BACKOFF * 2u32.pow(attempt - 1)
            };
            tracing::debug!(
                attempt,
                status = status.as_u16(),
                delay_ms = delay.as_millis() as u64,
                "edit not accepted yet, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Show "Bot is typing…" in `channel_id` for ~10 seconds.
    ///
    /// A no-op without a bot token.
    pub async fn trigger_typing(&self, channel_id: &str) -> Result<()> {
        let Some(token) = self.bot_token.as_deref() else {
            return Ok(());
        };
        let url = format!("{}/channels/{}/typing", self.api_base, channel_id);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {token}"))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Discord(discord_error_message(status.as_u16(), &text)));
        }
        Ok(())
    }

    /// Replace the application's command set, globally or in one guild.
    /// Returns how many commands Discord now reports.
    pub async fn bulk_overwrite_commands(
        &self,
        guild_id: Option<&str>,
        payload: &Value,
    ) -> Result<usize> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| Error::Auth("registering commands requires discord.bot_token".into()))?;

        let url = match guild_id {
            Some(guild) => format!(
                "{}/applications/{}/guilds/{}/commands",
                self.api_base, self.application_id, guild
            ),
            None => format!("{}/applications/{}/commands", self.api_base, self.application_id),
        };

        let resp = self
            .client
            .put(&url)
            .header("Authorization", format!("Bot {token}"))
            .json(payload)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::Auth(discord_error_message(status.as_u16(), &text)));
        }
        if !status.is_success() {
            return Err(Error::Discord(discord_error_message(status.as_u16(), &text)));
        }

        let registered: Value = serde_json::from_str(&text)?;
        Ok(registered.as_array().map_or(0, Vec::len))
    }
}

/// Discord errors look like `{"message": "...", "code": 10015}`.
fn discord_error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str());
    let code = parsed.as_ref().and_then(|v| v.get("code")).and_then(|c| c.as_u64());

    match (message, code) {
        (Some(message), Some(code)) => format!("HTTP {status} - {message} (code {code})"),
        (Some(message), None) => format!("HTTP {status} - {message}"),
        _ => format!("HTTP {status} - {}", body.trim()),
    }
}

/// `retry_after` (seconds, fractional) from a 429 body.
fn retry_after(body: &str) -> Option<Duration> {
    let secs = serde_json::from_str::<Value>(body)
        .ok()?
        .get("retry_after")?
        .as_f64()?;
    Duration::try_from_secs_f64(secs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_uses_discord_shape() {
        assert_eq!(
            discord_error_message(404, r#"{"message": "Unknown Webhook", "code": 10015}"#),
            "HTTP 404 - Unknown Webhook (code 10015)"
        );
        assert_eq!(discord_error_message(502, "bad gateway\n"), "HTTP 502 - bad gateway");
    }

    #[test]
    fn retry_after_is_fractional_seconds() {
        assert_eq!(
            retry_after(r#"{"message": "You are being rate limited.", "retry_after": 0.5, "global": false}"#),
            Some(Duration::from_millis(500))
        );
        assert_eq!(retry_after("{}"), None);
        assert_eq!(retry_after(r#"{"retry_after": -1}"#), None);
        assert_eq!(retry_after(r#"{"retry_after": 1e30}"#), None);
    }

    #[test]
    fn client_without_token_skips_typing() {
        let cfg = DiscordConfig {
            application_id: "1".into(),
            bot_token: tb_domain::config::SecretConfig::from_env("TB_TEST_DISCORD_TOKEN_NEVER_SET"),
            ..Default::default()
        };
        let client = DiscordClient::from_config(&cfg, &NetworkConfig::default()).unwrap();
        assert!(!client.has_bot_token());
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        assert!(rt.block_on(client.trigger_typing("123")).is_ok());
    }
}
