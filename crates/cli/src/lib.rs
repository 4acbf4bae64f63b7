//! `assetwatch` library crate.
//!
//! Re-exports the CLI modules for testing. The binary entrypoint lives in
//! `main.rs`.

pub mod commands;
pub mod config;
pub mod logging;
