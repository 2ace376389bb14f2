use tb_domain::config::{Config, ConfigSeverity};
use tb_domain::secret::resolve_secret;
use tb_store::{create_table_client, StoreReader};

use crate::discord::{DiscordClient, SignatureVerifier};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("tablebot doctor");
    println!("===============\n");

    let mut all_passed = true;

    // 1. Config file
    check_config_file(config_path, &mut all_passed);

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Table reachable (one DescribeTable call)
    check_store(config, &mut all_passed).await;

    // 4. Generator credentials
    check_llm_key(config, &mut all_passed);

    // 5. Discord application
    check_discord(config, &mut all_passed);

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

async fn check_store(config: &Config, all_passed: &mut bool) {
    let table = &config.store.table_name;
    let result = match create_table_client(&config.store, &config.network) {
        Ok(client) => StoreReader::new(client).approximate_count().await,
        Err(e) => Err(e),
    };

    let ok = result.is_ok();
    print_check(
        "Table reachable",
        ok,
        match result {
            Ok(count) => format!("{table} (~{count} items)"),
            Err(e) => format!("{table}: {e}"),
        },
    );
    if !ok {
        *all_passed = false;
    }
}

fn check_llm_key(config: &Config, all_passed: &mut bool) {
    let result = resolve_secret(&config.llm.api_key);
    let ok = result.is_ok();
    print_check(
        "LLM API key",
        ok,
        match result {
            Ok(_) => format!("{} / {}", config.llm.id, config.llm.model),
            Err(e) => e.to_string(),
        },
    );
    if !ok {
        *all_passed = false;
    }
}

fn check_discord(config: &Config, all_passed: &mut bool) {
    let key = SignatureVerifier::from_hex(&config.discord.public_key);
    let key_ok = key.is_ok();
    print_check(
        "Discord public key",
        key_ok,
        match key {
            Ok(_) => format!("application {}", config.discord.application_id),
            Err(e) => e.to_string(),
        },
    );
    if !key_ok {
        *all_passed = false;
    }

    // A missing bot token only disables optional features.
    let has_token = DiscordClient::from_config(&config.discord, &config.network)
        .map(|c| c.has_bot_token())
        .unwrap_or(false);
    print_check(
        "Discord bot token",
        true,
        if has_token {
            "present".into()
        } else {
            "absent (typing indicator and register-commands disabled)".into()
        },
    );
}

fn print_check(name: &str, passed: bool, detail: String) {
    let tag = if passed { "PASS" } else { "FAIL" };
    println!("  [{tag}] {name}: {detail}");
}
