//! Prompt assembly: instructions, delimited context, then the question.

use crate::serializer::SerializedContext;

const PREAMBLE: &str =
    "You are a smart personal assistant. Below are all the records from my DynamoDB table:";

const INSTRUCTIONS: &str = "Answer the user's question accurately based on the data above. \
If the answer cannot be found in the data, say so honestly. \
Reply in the same language the user used to ask.";

/// Compose the generator prompt from serialized context and the question.
///
/// The context sits in a fenced `json` block so the model can tell data
/// from instructions.  The question is appended verbatim.
pub fn build_prompt(context_text: &str, question: &str) -> String {
    compose(context_text, None, question)
}

/// Like [`build_prompt`], but when the context was capped, tells the model
/// how many records it is not seeing.
pub fn build_prompt_for(context: &SerializedContext, question: &str) -> String {
    let notice = (!context.is_complete()).then(|| {
        format!(
            "Note: only the first {} of {} records are shown; {} were omitted to fit the size limit. \
Do not claim facts about records you cannot see.",
            context.included,
            context.total,
            context.omitted()
        )
    });
    compose(&context.text, notice.as_deref(), question)
}

fn compose(context_text: &str, notice: Option<&str>, question: &str) -> String {
    let mut out = String::with_capacity(context_text.len() + question.len() + 512);
    out.push_str(PREAMBLE);
    out.push_str("\n```json\n");
    out.push_str(context_text);
    out.push_str("\n```\n");
    if let Some(notice) = notice {
        out.push_str(notice);
        out.push('\n');
    }
    out.push_str(INSTRUCTIONS);
    out.push_str("\n\nThe user's question is: ");
    out.push_str(question);
    out
}
