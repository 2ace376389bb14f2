//! Secret resolution shared by the store, generator, and Discord clients.

use crate::config::SecretConfig;
use crate::error::{Error, Result};

/// Resolve a secret from a [`SecretConfig`].
///
/// Precedence:
/// 1. `key` field (plaintext — warn)
/// 2. `service` + `account` → OS keychain via `keyring`
/// 3. `env` field (reads environment variable)
/// 4. Fallback for keychain mode: env var `{SERVICE}_{ACCOUNT}` uppercased
/// 5. Error
pub fn resolve_secret(secret: &SecretConfig) -> Result<String> {
    // 1. Plaintext key (warn the user)
    if let Some(ref key) = secret.key {
        tracing::warn!(
            "secret loaded from plaintext config field 'key' — \
             prefer 'env' or keychain 'service'+'account' instead"
        );
        return Ok(key.clone());
    }

    // 2. OS keychain via service + account
    if let (Some(ref service), Some(ref account)) = (&secret.service, &secret.account) {
        match resolve_from_keychain(service, account) {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    service = %service,
                    account = %account,
                    error = %e,
                    "keychain lookup failed, falling through to env"
                );
            }
        }
    }

    // 3. Env var
    if let Some(ref env_var) = secret.env {
        return match std::env::var(env_var) {
            Ok(v) if !v.is_empty() => Ok(v),
            _ => Err(Error::Auth(format!(
                "environment variable '{env_var}' not set or empty"
            ))),
        };
    }

    // 4. Headless fallback: {SERVICE}_{ACCOUNT} uppercased
    if let (Some(ref service), Some(ref account)) = (&secret.service, &secret.account) {
        let fallback_var = keychain_fallback_env_name(service, account);
        if let Ok(val) = std::env::var(&fallback_var) {
            tracing::info!(
                env_var = %fallback_var,
                "secret resolved from keychain headless fallback env var"
            );
            return Ok(val);
        }
    }

    Err(Error::Auth(
        "no secret configured: set 'key', 'env', or keychain 'service'+'account'".into(),
    ))
}

/// Like [`resolve_secret`], but an unconfigured or unset secret yields
/// `None` instead of an error.
pub fn resolve_optional_secret(secret: &SecretConfig) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    resolve_secret(secret).ok()
}

/// Read a secret from the OS keychain.
pub fn resolve_from_keychain(service: &str, account: &str) -> Result<String> {
    let entry = keyring::Entry::new(service, account)
        .map_err(|e| Error::Auth(format!("keyring entry creation failed: {e}")))?;
    entry
        .get_password()
        .map_err(|e| Error::Auth(format!("keyring get_password failed: {e}")))
}

/// Store a secret in the OS keychain.
pub fn store_in_keychain(service: &str, account: &str, value: &str) -> Result<()> {
    let entry = keyring::Entry::new(service, account)
        .map_err(|e| Error::Auth(format!("keyring entry creation failed: {e}")))?;
    entry
        .set_password(value)
        .map_err(|e| Error::Auth(format!("keyring set_password failed: {e}")))
}

/// Build the headless fallback env var name for a keychain service/account.
///
/// Example: `("tablebot", "gemini-api-key")` → `"TABLEBOT_GEMINI_API_KEY"`.
pub fn keychain_fallback_env_name(service: &str, account: &str) -> String {
    format!(
        "{}_{}",
        service.to_uppercase().replace('-', "_"),
        account.to_uppercase().replace('-', "_"),
    )
}

/// Mask a secret for display, keeping at most the last four characters.
pub fn mask(value: &str) -> String {
    let count = value.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_env_name_basic() {
        assert_eq!(
            keychain_fallback_env_name("tablebot", "gemini-api-key"),
            "TABLEBOT_GEMINI_API_KEY"
        );
    }

    #[test]
    fn plaintext_key_wins() {
        let secret = SecretConfig {
            key: Some("plaintext-wins".into()),
            env: Some("TB_TEST_SHOULD_NOT_BE_READ".into()),
            ..Default::default()
        };
        assert_eq!(resolve_secret(&secret).unwrap(), "plaintext-wins");
    }

    #[test]
    fn env_var_resolves() {
        let var_name = "TB_TEST_RESOLVE_ENV_SECRET_4411";
        std::env::set_var(var_name, "env-secret-value");
        let secret = SecretConfig::from_env(var_name);
        assert_eq!(resolve_secret(&secret).unwrap(), "env-secret-value");
        std::env::remove_var(var_name);
    }

    #[test]
    fn missing_env_var_names_the_variable() {
        let secret = SecretConfig::from_env("TB_TEST_NONEXISTENT_VAR_9191");
        let err = resolve_secret(&secret).unwrap_err();
        assert!(err.to_string().contains("TB_TEST_NONEXISTENT_VAR_9191"));
    }

    #[test]
    fn unconfigured_secret_is_an_auth_error() {
        let err = resolve_secret(&SecretConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no secret configured"));
        assert!(resolve_optional_secret(&SecretConfig::default()).is_none());
    }

    #[test]
    fn keychain_headless_fallback() {
        let fallback_var = "TABLEBOT_TEST_FALLBACK_PROVIDER";
        std::env::set_var(fallback_var, "fallback-secret");
        let secret = SecretConfig {
            service: Some("tablebot".into()),
            account: Some("test-fallback-provider".into()),
            ..Default::default()
        };
        assert_eq!(resolve_secret(&secret).unwrap(), "fallback-secret");
        std::env::remove_var(fallback_var);
    }

    #[test]
    fn mask_keeps_tail_only() {
        assert_eq!(mask("short"), "*****");
        assert_eq!(mask("abcdefghijkl"), "********ijkl");
    }
}
