//! `tablebot count` / `tablebot ask`: the same pipeline, replying on the
//! console instead of Discord.

use std::io::Write;

use tb_domain::config::Config;
use tb_domain::error::Result;

use crate::bootstrap;
use crate::runtime::{Acknowledgement, Command, CommandKind, Issuer, Outcome, ReplyHandle};

/// Prints the terminal edit to stdout and working pulses to stderr.
pub struct ConsoleReply;

#[async_trait::async_trait]
impl ReplyHandle for ConsoleReply {
    async fn edit(&self, content: &str) -> Result<()> {
        println!("{content}");
        Ok(())
    }

    async fn show_working(&self) -> Result<()> {
        eprint!(".");
        std::io::stderr().flush()?;
        Ok(())
    }
}

/// Run one command to completion.  Returns `true` when it completed.
pub async fn run(config: &Config, kind: CommandKind) -> anyhow::Result<bool> {
    bootstrap::check_pipeline_config(config)?;
    let pipeline = bootstrap::build_pipeline(config)?;
    let name = match kind {
        CommandKind::Count => "count",
        CommandKind::Ask { .. } => "ask",
    };
    let command = Command::new(name, local_issuer(), kind);

    match pipeline.acknowledge(&command) {
        Acknowledgement::Placeholder(text) => eprintln!("{text}"),
        Acknowledgement::Deferred => eprint!("Thinking"),
    }

    let outcome = pipeline
        .execute(command, std::sync::Arc::new(ConsoleReply))
        .await;
    Ok(outcome == Outcome::Completed)
}

fn local_issuer() -> Issuer {
    let name = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "console".into());
    Issuer {
        id: name.clone(),
        display_name: name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_pipeline_settings_stop_before_any_call() {
        let mut config: Config = toml::from_str(
            r#"
[store]
table_name = "pets"
region = "us-west-2"
"#,
        )
        .unwrap();
        config.pipeline.message_limit = 5000;

        let err = run(&config, CommandKind::Count).await.unwrap_err();
        assert!(err.to_string().contains("config validation failed"), "{err}");
    }
}
