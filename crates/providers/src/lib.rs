//! `tb-providers`: text-generation backends.
//!
//! The [`LlmProvider`] trait is the seam the answer generator calls through;
//! [`GoogleProvider`] is the Gemini `generateContent` adapter.

pub mod google;
pub mod registry;
pub mod traits;

pub use google::GoogleProvider;
pub use registry::create_provider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
