use chrono::{DateTime, Utc};

/// Placeholder shown while a count command is in flight.
pub const COUNT_PLACEHOLDER: &str = "Counting rows in the table, please wait...";

/// Who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    /// Stable platform id (a Discord snowflake, or a local user name).
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Report the table's approximate item count.
    Count,
    /// Answer a free-text question from the full table contents.
    Ask { question: String },
}

/// One inbound command.  Lives for a single pipeline run.
#[derive(Debug, Clone)]
pub struct Command {
    /// The name it was invoked under (an alias, possibly).
    pub name: String,
    pub issuer: Issuer,
    pub kind: CommandKind,
    pub received_at: DateTime<Utc>,
}

impl Command {
    pub fn new(name: impl Into<String>, issuer: Issuer, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            issuer,
            kind,
            received_at: Utc::now(),
        }
    }

    pub fn is_count(&self) -> bool {
        matches!(self.kind, CommandKind::Count)
    }
}

/// The immediate response that creates the provisional reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// A visible placeholder message with this content.
    Placeholder(String),
    /// A "thinking" state with no content; the platform renders progress.
    Deferred,
}
