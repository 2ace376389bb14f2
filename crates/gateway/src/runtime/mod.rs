//! Command runtime: the ack-first pipeline and its collaborators.
//!
//! Entry point: [`CommandPipeline::dispatch`] computes the acknowledgment
//! synchronously, spawns the slow work, and returns the acknowledgment for
//! the caller to send.

pub mod command;
pub mod generate;
pub mod pipeline;
pub mod working;

pub use command::{Acknowledgement, Command, CommandKind, Issuer, COUNT_PLACEHOLDER};
pub use generate::AnswerGenerator;
pub use pipeline::{
    format_count_reply, CommandPipeline, Outcome, PipelineError, PipelineSettings, PipelineState,
    ReplyHandle,
};
pub use working::WorkingIndicator;
