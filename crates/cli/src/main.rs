//! `assetwatch` -- notification preference management CLI.
//!
//! Reads and writes the JSON configuration store, resolves effective
//! configurations across user, site, asset and job levels, and evaluates
//! how alerts would be delivered.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default                     | Description                  |
//! |-------------------------|----------|-----------------------------|------------------------------|
//! | `ASSETWATCH_STORE_PATH` | no       | `notification-configs.json` | JSON configuration store     |
//! | `ASSETWATCH_LOG_FORMAT` | no       | `text`                      | `text` or `json` log lines   |
//! | `RUST_LOG`              | no       | `assetwatch_cli=info,...`   | Log filter                   |

use anyhow::Context;
use clap::Parser;

use assetwatch_cli::commands::{self, Cli};
use assetwatch_cli::config::CliConfig;
use assetwatch_cli::logging;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env();
    logging::init(config.log_format);

    let cli = Cli::parse();
    let store_path = config.resolve_store_path(cli.store.as_deref());
    tracing::debug!(store = %store_path.display(), command = ?cli.command, "Running command");

    let output = commands::execute(&cli.command, &store_path)?;
    let rendered = serde_json::to_string_pretty(&output).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
