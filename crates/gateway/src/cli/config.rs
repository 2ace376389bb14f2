use anyhow::Context;
use tb_domain::config::{Config, ConfigSeverity, SecretConfig};
use tb_domain::secret::{mask, resolve_from_keychain, store_in_keychain};

/// Keychain service used when a secret does not name its own.
const DEFAULT_KEYCHAIN_SERVICE: &str = "tablebot";

const SECRET_NAMES: &[&str] = &[
    "llm",
    "discord",
    "aws-access-key-id",
    "aws-secret-access-key",
    "aws-session-token",
];

/// Parse and validate the config, printing any issues.
///
/// Exits with code 0 when valid, code 1 when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config).context("serializing config")?;
    print!("{output}");
    Ok(())
}

/// Prompt for a credential and store it in the OS keychain.
pub fn set_secret(config: &Config, name: &str) -> anyhow::Result<()> {
    let (service, account) = keychain_slot(config, name)?;
    let value = rpassword::prompt_password_stdout(&format!("Value for {name}: "))
        .context("reading secret from terminal")?;
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("empty value, nothing stored");
    }
    store_in_keychain(&service, &account, value)?;
    println!("Stored {name} in keychain ({service}/{account}).");
    println!("Reference it in config.toml with:");
    println!("  service = \"{service}\"");
    println!("  account = \"{account}\"");
    Ok(())
}

/// Print a masked credential from the OS keychain.
pub fn get_secret(config: &Config, name: &str) -> anyhow::Result<()> {
    let (service, account) = keychain_slot(config, name)?;
    let value = resolve_from_keychain(&service, &account)?;
    println!("{name} ({service}/{account}): {}", mask(&value));
    Ok(())
}

/// The keychain service/account for a named credential: the ones set in
/// config, else `tablebot` / the name itself.
fn keychain_slot(config: &Config, name: &str) -> anyhow::Result<(String, String)> {
    let secret = secret_by_name(config, name).ok_or_else(|| {
        anyhow::anyhow!("unknown secret '{name}' (expected one of: {})", SECRET_NAMES.join(", "))
    })?;
    let service = secret
        .service
        .clone()
        .unwrap_or_else(|| DEFAULT_KEYCHAIN_SERVICE.to_owned());
    let account = secret.account.clone().unwrap_or_else(|| name.to_owned());
    Ok((service, account))
}

fn secret_by_name<'a>(config: &'a Config, name: &str) -> Option<&'a SecretConfig> {
    match name {
        "llm" => Some(&config.llm.api_key),
        "discord" => Some(&config.discord.bot_token),
        "aws-access-key-id" => Some(&config.store.access_key_id),
        "aws-secret-access-key" => Some(&config.store.secret_access_key),
        "aws-session-token" => Some(&config.store.session_token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slot_uses_tablebot_service() {
        let (service, account) = keychain_slot(&Config::default(), "llm").unwrap();
        assert_eq!(service, "tablebot");
        assert_eq!(account, "llm");
    }

    #[test]
    fn configured_slot_wins() {
        let mut config = Config::default();
        config.discord.bot_token = SecretConfig {
            service: Some("bots".into()),
            account: Some("tablebot-discord".into()),
            ..Default::default()
        };
        let (service, account) = keychain_slot(&config, "discord").unwrap();
        assert_eq!((service.as_str(), account.as_str()), ("bots", "tablebot-discord"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = keychain_slot(&Config::default(), "openai").unwrap_err();
        assert!(err.to_string().contains("aws-secret-access-key"));
    }

    #[test]
    fn every_listed_name_resolves() {
        let config = Config::default();
        for name in SECRET_NAMES {
            assert!(secret_by_name(&config, name).is_some(), "{name}");
        }
    }
}
