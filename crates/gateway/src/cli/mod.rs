pub mod config;
pub mod doctor;
pub mod local;
pub mod register;

use clap::{Parser, Subcommand};

/// tablebot: answers Discord slash commands from a DynamoDB table.
#[derive(Debug, Parser)]
#[command(name = "tablebot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactions server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Declare the configured slash commands to Discord.
    RegisterCommands,
    /// Print the table's approximate row count, as the count command would.
    Count,
    /// Answer a question from the table, as the question command would.
    Ask {
        /// The question, in any language.
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
    /// Store a credential in the OS keychain.
    SetSecret {
        /// One of: llm, discord, aws-access-key-id, aws-secret-access-key,
        /// aws-session-token.
        name: String,
    },
    /// Read and display (masked) a credential from the OS keychain.
    GetSecret {
        /// Same names as `set-secret`.
        name: String,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `TB_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: tb_domain::config::Config
pub fn load_config() -> anyhow::Result<(tb_domain::config::Config, String)> {
    let config_path = std::env::var("TB_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, or return the defaults when it does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<tb_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(tb_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config_from("/nonexistent/tablebot/config.toml").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.discord.ask_commands, ["ai", "ask", "chat"]);
    }

    #[test]
    fn ask_joins_trailing_words() {
        let cli = Cli::try_parse_from(["tablebot", "ask", "when", "was", "Mochi", "fed?"]).unwrap();
        match cli.command {
            Some(Command::Ask { question }) => assert_eq!(question.join(" "), "when was Mochi fed?"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["tablebot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn set_secret_takes_a_name() {
        let cli = Cli::try_parse_from(["tablebot", "config", "set-secret", "llm"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::SetSecret { ref name })) if name == "llm"
        ));
    }
}
