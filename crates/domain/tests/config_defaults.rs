use tb_domain::config::{Config, ConfigSeverity};

fn minimal_valid() -> Config {
    let toml_str = r#"
[discord]
application_id = "1234567890"
public_key = "ab12"

[store]
table_name = "pets"
region = "us-west-2"
"#;
    toml::from_str(toml_str).unwrap()
}

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn default_commands_mirror_hello_and_ai_aliases() {
    let config = Config::default();
    assert_eq!(config.discord.count_commands, vec!["hello"]);
    assert_eq!(config.discord.ask_commands, vec!["ai", "ask", "chat"]);
    assert_eq!(config.discord.question_option, "prompt");
}

#[test]
fn default_pipeline_fits_inside_platform_window() {
    let config = Config::default();
    assert_eq!(config.pipeline.message_limit, 2000);
    assert!(config.pipeline.deadline_secs < tb_domain::config::PLATFORM_EDIT_WINDOW_SECS);
}

#[test]
fn default_credentials_come_from_standard_env_vars() {
    let config = Config::default();
    assert_eq!(config.store.access_key_id.env.as_deref(), Some("AWS_ACCESS_KEY_ID"));
    assert_eq!(config.store.secret_access_key.env.as_deref(), Some("AWS_SECRET_ACCESS_KEY"));
    assert_eq!(config.discord.bot_token.env.as_deref(), Some("DISCORD_TOKEN"));
    assert_eq!(config.llm.api_key.env.as_deref(), Some("GEMINI_API_KEY"));
}

#[test]
fn minimal_config_has_no_errors() {
    let issues = minimal_valid().validate();
    assert!(
        issues.iter().all(|i| i.severity == ConfigSeverity::Warning),
        "unexpected errors: {issues:?}"
    );
}

#[test]
fn empty_config_reports_missing_discord_and_table() {
    let issues = Config::default().validate();
    let fields: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| i.field.as_str())
        .collect();
    assert!(fields.contains(&"discord.application_id"));
    assert!(fields.contains(&"discord.public_key"));
    assert!(fields.contains(&"store.table_name"));
}

#[test]
fn deadline_past_edit_window_is_an_error() {
    let mut config = minimal_valid();
    config.pipeline.deadline_secs = 901;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "pipeline.deadline_secs" && i.severity == ConfigSeverity::Error));
}

#[test]
fn command_listed_twice_is_an_error() {
    let mut config = minimal_valid();
    config.discord.count_commands = vec!["ai".into()];
    let issues = config.validate();
    assert!(issues.iter().any(|i| i.field == "discord.count_commands"));
}

#[test]
fn missing_bot_token_is_only_a_warning() {
    let mut config = minimal_valid();
    config.discord.bot_token = Default::default();
    let issues = config.validate();
    let token_issue = issues
        .iter()
        .find(|i| i.field == "discord.bot_token")
        .expect("bot token warning");
    assert_eq!(token_issue.severity, ConfigSeverity::Warning);
}

#[test]
fn full_config_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210

[discord]
application_id = "42"
public_key = "00ff"
guild_id = "777"
ask_commands = ["ask"]
working_interval_secs = 5

[store]
table_name = "events"
region = "eu-central-1"
endpoint = "http://localhost:8000"
page_limit = 250

[llm]
model = "gemini-2.0-flash"
max_output_tokens = 1024

[context]
max_chars = 200000

[pipeline]
deadline_secs = 300

[network]
proxy = "socks5h://127.0.0.1:40000"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 3210);
    assert_eq!(config.discord.guild_id.as_deref(), Some("777"));
    assert_eq!(config.discord.ask_commands, vec!["ask"]);
    assert_eq!(config.store.page_limit, Some(250));
    assert_eq!(config.store.endpoint.as_deref(), Some("http://localhost:8000"));
    assert_eq!(config.llm.max_output_tokens, Some(1024));
    assert_eq!(config.context.max_chars, 200_000);
    assert_eq!(config.pipeline.deadline_secs, 300);
    assert_eq!(
        config.network.resolved_proxy().as_deref(),
        Some("socks5h://127.0.0.1:40000")
    );
}

#[test]
fn message_limit_above_platform_maximum_is_an_error() {
    let mut config = minimal_valid();
    config.pipeline.message_limit = 5000;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "pipeline.message_limit" && i.severity == ConfigSeverity::Error));

    config.pipeline.message_limit = tb_domain::config::PLATFORM_MESSAGE_LIMIT;
    assert!(config.validate().iter().all(|i| i.field != "pipeline.message_limit"));
}

#[test]
fn pipeline_validation_ignores_discord_settings() {
    let mut config = minimal_valid();
    config.discord = Default::default();
    config.discord.application_id.clear();
    config.discord.public_key.clear();
    assert!(config
        .validate_pipeline()
        .iter()
        .all(|i| !i.field.starts_with("discord")));

    config.pipeline.deadline_secs = 0;
    assert!(config
        .validate_pipeline()
        .iter()
        .any(|i| i.field == "pipeline.deadline_secs"));
}

#[test]
fn shutdown_grace_defaults_to_thirty_seconds() {
    assert_eq!(Config::default().pipeline.shutdown_grace_secs, 30);
}
