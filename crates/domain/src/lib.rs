//! `tb-domain`: shared types for every tablebot crate.
//!
//! Holds the error type, the configuration tree, the typed record model
//! returned by the document store, secret resolution, and the outbound
//! HTTP client builder.

pub mod config;
pub mod error;
pub mod net;
pub mod record;
pub mod secret;
