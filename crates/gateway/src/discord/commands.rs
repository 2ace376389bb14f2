//! Slash-command catalog: name → command kind, and the registration
//! payload that declares those names to Discord.

use serde_json::{json, Value};
use tb_domain::config::DiscordConfig;

use super::interaction::{Interaction, INTERACTION_APPLICATION_COMMAND, OPTION_STRING};
use crate::runtime::{Command, CommandKind};

const COUNT_DESCRIPTION: &str = "Show the table's approximate row count";
const ASK_DESCRIPTION: &str = "Ask the AI a question about the table's contents";
const QUESTION_DESCRIPTION: &str = "Your question";

/// Why an interaction never entered the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("not an application command")]
    NotACommand,
    #[error("unknown command /{0}")]
    UnknownCommand(String),
    #[error("/{command} needs a `{option}` argument")]
    MissingQuestion { command: String, option: String },
    #[error("interaction carries no user")]
    NoIssuer,
}

impl Rejection {
    /// Ephemeral text shown to the user.
    pub fn user_message(&self) -> String {
        format!("⚠️ {self}")
    }
}

#[derive(Debug, Clone)]
pub struct CommandCatalog {
    count: Vec<String>,
    ask: Vec<String>,
    question_option: String,
}

impl CommandCatalog {
    pub fn from_config(cfg: &DiscordConfig) -> Self {
        Self {
            count: cfg.count_commands.clone(),
            ask: cfg.ask_commands.clone(),
            question_option: cfg.question_option.clone(),
        }
    }

    pub fn is_count(&self, name: &str) -> bool {
        self.count.iter().any(|n| n == name)
    }

    pub fn is_ask(&self, name: &str) -> bool {
        self.ask.iter().any(|n| n == name)
    }

    /// Turn an `APPLICATION_COMMAND` interaction into a pipeline command.
    pub fn parse(&self, interaction: &Interaction) -> Result<Command, Rejection> {
        if interaction.kind != INTERACTION_APPLICATION_COMMAND {
            return Err(Rejection::NotACommand);
        }
        let data = interaction.data.as_ref().ok_or(Rejection::NotACommand)?;
        let issuer = interaction.issuer().ok_or(Rejection::NoIssuer)?;

        let kind = if self.is_count(&data.name) {
            CommandKind::Count
        } else if self.is_ask(&data.name) {
            let question = data
                .string_option(&self.question_option)
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .ok_or_else(|| Rejection::MissingQuestion {
                    command: data.name.clone(),
                    option: self.question_option.clone(),
                })?;
            CommandKind::Ask {
                question: question.to_owned(),
            }
        } else {
            return Err(Rejection::UnknownCommand(data.name.clone()));
        };

        Ok(Command::new(data.name.clone(), issuer, kind))
    }

    /// Body for `PUT /applications/{id}/commands`: every configured name,
    /// aliases included, as a chat-input command.
    pub fn registration_payload(&self) -> Value {
        let count = self.count.iter().map(|name| {
            json!({
                "name": name,
                "type": 1,
                "description": COUNT_DESCRIPTION,
            })
        });
        let ask = self.ask.iter().map(|name| {
            json!({
                "name": name,
                "type": 1,
                "description": ASK_DESCRIPTION,
                "options": [{
                    "name": self.question_option,
                    "type": OPTION_STRING,
                    "description": QUESTION_DESCRIPTION,
                    "required": true,
                }],
            })
        });
        Value::Array(count.chain(ask).collect())
    }
}
