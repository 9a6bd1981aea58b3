//! Host wiring for the demo binary: config loading and CLI.

pub mod config;
pub mod cli;

pub use config::{DemoConfig, PeerEntry, BatchEntry};
pub use cli::run_cli;
