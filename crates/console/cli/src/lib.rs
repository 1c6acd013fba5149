//! Mission console command line
//!
//! Library half of the `mission-console` binary: layered configuration and
//! the subcommands, kept here so they can be tested without a process.

#![deny(unsafe_code)]

pub mod commands;
pub mod config;

pub use config::{AppConfig, LoggingConfig};
