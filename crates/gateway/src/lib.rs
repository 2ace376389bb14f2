//! `tb-gateway`: the `tablebot` binary's library half.
//!
//! * [`runtime`] holds the ack-first command pipeline.
//! * [`discord`] binds it to Discord HTTP interactions.
//! * [`api`] exposes the axum routes, [`bootstrap`] wires the state.
//! * [`cli`] implements the subcommands.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod discord;
pub mod runtime;
pub mod state;
