//! `applysmart-cli` library crate.
//!
//! Re-exports the command and config modules for integration testing. The
//! binary entrypoint lives in `main.rs`.

pub mod command;
pub mod config;

pub use command::{execute, Command};
pub use config::CliConfig;
