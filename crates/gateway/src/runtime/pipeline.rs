//! Command pipeline: acknowledge first, then run the slow work and deliver
//! exactly one terminal edit.
//!
//! ```text
//! Received ─ack─▶ Acknowledged ─▶ CountQuery ─┬─▶ Completed
//!                              └▶ FullQuery  ─┴─▶ Failed
//! ```
//!
//! The acknowledgment is computed without touching the store or the
//! generator.  Everything after it runs on a tracked task under the
//! configured deadline; [`CommandPipeline::shutdown`] drains those tasks so
//! a stopping server still edits every reply it acknowledged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use tb_contextpack::{build_prompt_for, format_with_limit, serialize_bounded};
use tb_domain::config::Config;
use tb_domain::error::{Error, Result};
use tb_store::{ApproximateCount, StoreReader};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use uuid::Uuid;

use super::command::{Acknowledgement, Command, CommandKind, COUNT_PLACEHOLDER};
use super::generate::AnswerGenerator;
use super::working::WorkingIndicator;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reply handle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The provisional reply created by the acknowledgment.
///
/// The pipeline calls [`edit`](Self::edit) exactly once per command.
#[async_trait::async_trait]
pub trait ReplyHandle: Send + Sync {
    /// Replace the provisional reply's content.
    async fn edit(&self, content: &str) -> Result<()>;

    /// Pulse the "working" indicator.  Called repeatedly while a full query
    /// runs.
    async fn show_working(&self) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why a pipeline run ended in [`PipelineState::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    StoreUnavailable(Error),

    #[error("{0}")]
    Context(Error),

    #[error("{0}")]
    Generation(Error),

    #[error("timed out after {}s", .0.as_secs())]
    DeadlineExceeded(Duration),

    #[error("interrupted because the bot is shutting down")]
    Interrupted,
}

impl PipelineError {
    /// The single warning-marked line shown to the issuer.
    pub fn user_message(&self, kind: &CommandKind) -> String {
        match kind {
            CommandKind::Count => format!("⚠️ Database query failed: {self}"),
            CommandKind::Ask { .. } => format!("⚠️ AI processing failed: {self}"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State machine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    Acknowledged,
    CountQuery,
    FullQuery,
    Completed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Acknowledged => "acknowledged",
            Self::CountQuery => "count_query",
            Self::FullQuery => "full_query",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = state.as_str(), to = next.as_str(), "pipeline transition");
    *state = next;
}

/// Terminal result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub context_max_chars: usize,
    pub message_limit: usize,
    pub deadline: Duration,
    pub working_interval: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            context_max_chars: config.context.max_chars,
            message_limit: config.pipeline.message_limit,
            deadline: Duration::from_secs(config.pipeline.deadline_secs),
            working_interval: Duration::from_secs(config.discord.working_interval_secs),
        }
    }
}

/// Shared by every command.  Holds only the read-only store and generator
/// handles; each run keeps its own state on its own task.
pub struct CommandPipeline {
    store: StoreReader,
    generator: AnswerGenerator,
    settings: PipelineSettings,
    runs: TaskTracker,
    interrupt: CancellationToken,
}

impl CommandPipeline {
    pub fn new(store: StoreReader, generator: AnswerGenerator, settings: PipelineSettings) -> Self {
        Self {
            store,
            generator,
            settings,
            runs: TaskTracker::new(),
            interrupt: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn store(&self) -> &StoreReader {
        &self.store
    }

    /// The immediate response for `command`.  Never suspends.
    pub fn acknowledge(&self, command: &Command) -> Acknowledgement {
        match command.kind {
            CommandKind::Count => Acknowledgement::Placeholder(COUNT_PLACEHOLDER.to_owned()),
            CommandKind::Ask { .. } => Acknowledgement::Deferred,
        }
    }

    /// Compute the acknowledgment and start the run in the background.
    ///
    /// The caller must deliver the returned acknowledgment; the run's only
    /// effect on `reply` is one terminal edit (plus working pulses).
    pub fn dispatch(self: &Arc<Self>, command: Command, reply: Arc<dyn ReplyHandle>) -> Acknowledgement {
        let ack = self.acknowledge(&command);
        let pipeline = Arc::clone(self);
        self.runs.spawn(async move {
            pipeline.execute(command, reply).await;
        });
        ack
    }

    /// Number of dispatched runs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.runs.len()
    }

    /// Wait for dispatched runs to deliver their terminal edit.
    ///
    /// Runs still going after `grace` are interrupted; each one then edits
    /// its reply with an interruption warning before this returns.
    pub async fn shutdown(&self, grace: Duration) {
        self.runs.close();
        let in_flight = self.runs.len();
        if in_flight == 0 {
            return;
        }

        tracing::info!(in_flight, grace_secs = grace.as_secs(), "waiting for running commands");
        if tokio::time::timeout(grace, self.runs.wait()).await.is_err() {
            tracing::warn!(
                remaining = self.runs.len(),
                "grace period over, interrupting running commands"
            );
            self.interrupt.cancel();
            self.runs.wait().await;
        }
    }

    /// Run everything after the acknowledgment and edit the provisional
    /// reply once with the result or the failure.
    pub async fn execute(&self, command: Command, reply: Arc<dyn ReplyHandle>) -> Outcome {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "command",
            run_id = %run_id,
            command = %command.name,
            issuer = %command.issuer.id,
        );

        async {
            let started = Instant::now();
            let mut state = PipelineState::Received;
            transition(&mut state, PipelineState::Acknowledged);

            let deadline = self.settings.deadline;
            let result = tokio::select! {
                timed = tokio::time::timeout(deadline, self.run(&command, &reply, &mut state)) => {
                    timed.unwrap_or(Err(PipelineError::DeadlineExceeded(deadline)))
                }
                _ = self.interrupt.cancelled() => Err(PipelineError::Interrupted),
            };

            let (text, outcome) = match result {
                Ok(text) => (text, Outcome::Completed),
                Err(e) => {
                    tracing::warn!(error = %e, state = state.as_str(), "command failed");
                    (e.user_message(&command.kind), Outcome::Failed)
                }
            };

            let text = format_with_limit(&text, self.settings.message_limit);
            if let Err(e) = reply.edit(&text).await {
                tracing::error!(error = %e, "terminal edit could not be delivered");
            }

            let terminal = match outcome {
                Outcome::Completed => PipelineState::Completed,
                Outcome::Failed => PipelineState::Failed,
            };
            transition(&mut state, terminal);
            tracing::info!(
                outcome = state.as_str(),
                reply_chars = text.chars().count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "command finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        command: &Command,
        reply: &Arc<dyn ReplyHandle>,
        state: &mut PipelineState,
    ) -> std::result::Result<String, PipelineError> {
        match &command.kind {
            CommandKind::Count => {
                transition(state, PipelineState::CountQuery);
                let count = self
                    .store
                    .approximate_count()
                    .await
                    .map_err(PipelineError::StoreUnavailable)?;
                Ok(format_count_reply(
                    &command.issuer.id,
                    Local::now().naive_local(),
                    count,
                ))
            }
            CommandKind::Ask { question } => {
                transition(state, PipelineState::FullQuery);
                let _working =
                    WorkingIndicator::start(Arc::clone(reply), self.settings.working_interval);

                let records = self
                    .store
                    .all_records()
                    .await
                    .map_err(PipelineError::StoreUnavailable)?;

                let context = serialize_bounded(&records.records, self.settings.context_max_chars)
                    .map_err(PipelineError::Context)?;
                tracing::debug!(
                    records = context.total,
                    included = context.included,
                    context_chars = context.text.chars().count(),
                    "context serialized"
                );

                let prompt = build_prompt_for(&context, question);
                self.generator
                    .generate(&prompt)
                    .await
                    .map_err(PipelineError::Generation)
            }
        }
    }
}

/// The count reply.  The figure is always labelled approximate.
pub fn format_count_reply(issuer_id: &str, now: NaiveDateTime, count: ApproximateCount) -> String {
    format!(
        "Hello! 👋 `{issuer_id}`\n🕒 Server time: `{}`\n📊 Approximate row count: `{count}`",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn count_reply_matches_template() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        let text = format_count_reply("4242", now, ApproximateCount(4821));
        assert_eq!(
            text,
            "Hello! 👋 `4242`\n🕒 Server time: `2024-03-09 07:05:00`\n📊 Approximate row count: `4821`"
        );
    }

    #[test]
    fn error_messages_carry_the_warning_marker() {
        let err = PipelineError::StoreUnavailable(Error::Store {
            table: "pets".into(),
            message: "ResourceNotFoundException".into(),
        });
        assert_eq!(
            err.user_message(&CommandKind::Count),
            "⚠️ Database query failed: table pets: ResourceNotFoundException"
        );
        let ask = CommandKind::Ask {
            question: "q".into(),
        };
        assert!(err.user_message(&ask).starts_with("⚠️ AI processing failed: table pets"));
    }

    #[test]
    fn deadline_message_names_the_budget() {
        let err = PipelineError::DeadlineExceeded(Duration::from_secs(600));
        let ask = CommandKind::Ask {
            question: "q".into(),
        };
        assert_eq!(err.user_message(&ask), "⚠️ AI processing failed: timed out after 600s");
    }

    #[test]
    fn interruption_says_why() {
        assert_eq!(
            PipelineError::Interrupted.user_message(&CommandKind::Count),
            "⚠️ Database query failed: interrupted because the bot is shutting down"
        );
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(PipelineState::Completed.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Acknowledged.is_terminal());
        assert!(!PipelineState::FullQuery.is_terminal());
    }
}
