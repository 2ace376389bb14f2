//! `tb-contextpack`: everything between the record set and the channel.
//!
//! * [`serializer`] renders records as a JSON array, optionally capped.
//! * [`prompt`] wraps that context and the user's question in the fixed
//!   instruction block.
//! * [`truncation`] bounds generated text to the channel's length ceiling.
//!
//! All functions here are pure.

pub mod prompt;
pub mod serializer;
pub mod truncation;

pub use prompt::{build_prompt, build_prompt_for};
pub use serializer::{serialize, serialize_bounded, SerializedContext};
pub use truncation::{format_for_channel, format_with_limit, CHANNEL_LIMIT, TRUNCATION_MARKER};
