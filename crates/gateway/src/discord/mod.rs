//! Discord binding: HTTP interactions in, REST edits out.

pub mod client;
pub mod commands;
pub mod interaction;
pub mod reply;
pub mod signature;

pub use client::DiscordClient;
pub use commands::{CommandCatalog, Rejection};
pub use interaction::{Interaction, InteractionResponse};
pub use reply::InteractionReply;
pub use signature::SignatureVerifier;
