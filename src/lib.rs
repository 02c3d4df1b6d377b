//! botdash: a terminal dashboard for a trading-bot HTTP API.
//!
//! The binary in `main.rs` is a thin clap front end over these modules.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod poller;
pub mod render;
pub mod runtime;
