//! Command-line surface: argument definitions and command execution.
//!
//! Every command prints a JSON document on stdout. Mutating commands write
//! through to the JSON store before returning.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use assetwatch_core::alert_routing::{evaluate_alert, AlertEvent};
use assetwatch_core::config_resolution::ResolutionContext;
use assetwatch_core::error::CoreError;
use assetwatch_core::notification_level::NotificationLevel;
use assetwatch_core::notification_preferences::{
    default_preferences, validate_preferences, AlertSeverity, NotificationPreferences,
};
use assetwatch_store::{JsonFileConfigProvider, NotificationConfigService};

/// Accepted format for `--at`.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Parser, Debug)]
#[command(name = "assetwatch", version, about = "Manage asset-alert notification preferences")]
pub struct Cli {
    /// Path to the JSON configuration store. Takes precedence over
    /// `ASSETWATCH_STORE_PATH`.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the effective configuration for a context.
    Resolve(ContextArgs),
    /// Resolve a context and report which levels hold a record.
    Inspect(ContextArgs),
    /// Print the record stored for one level and entity.
    Show(KeyArgs),
    /// Print every stored record.
    List,
    /// Store the default baseline for a user who has none.
    InitUser {
        #[arg(long)]
        user: String,
    },
    /// Validate and store a record read from a JSON file.
    Save {
        #[arg(long)]
        file: PathBuf,
    },
    /// Copy an existing record into an override at another level.
    Override {
        #[arg(long, value_parser = parse_level)]
        from_level: NotificationLevel,
        #[arg(long)]
        from_entity: String,
        #[arg(long, value_parser = parse_level)]
        level: NotificationLevel,
        #[arg(long)]
        entity: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete a site, asset or job record.
    Delete(KeyArgs),
    /// Decide how an alert would be delivered in a context.
    Evaluate {
        #[command(flatten)]
        context: ContextArgs,
        #[arg(long)]
        alert_type: String,
        #[arg(long, value_parser = parse_severity)]
        severity: AlertSeverity,
        /// Local time in the quiet-hours timezone, `YYYY-MM-DDTHH:MM`.
        /// Defaults to the current UTC time.
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    #[arg(long, value_parser = parse_level)]
    pub level: NotificationLevel,
    #[arg(long)]
    pub entity: String,
}

#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub site: Option<String>,
    #[arg(long, requires = "site")]
    pub site_name: Option<String>,
    #[arg(long)]
    pub asset: Option<String>,
    #[arg(long, requires = "asset")]
    pub asset_name: Option<String>,
    #[arg(long)]
    pub job: Option<String>,
    #[arg(long, requires = "job")]
    pub job_name: Option<String>,
}

impl ContextArgs {
    /// Build the resolution context. A missing display name falls back to
    /// the entity id.
    pub fn to_context(&self) -> ResolutionContext {
        let mut ctx = ResolutionContext::for_user(self.user.clone());
        if let Some(site) = &self.site {
            ctx = ctx.with_site(site.clone(), self.site_name.clone().unwrap_or_else(|| site.clone()));
        }
        if let Some(asset) = &self.asset {
            ctx = ctx.with_asset(
                asset.clone(),
                self.asset_name.clone().unwrap_or_else(|| asset.clone()),
            );
        }
        if let Some(job) = &self.job {
            ctx = ctx.with_job(job.clone(), self.job_name.clone().unwrap_or_else(|| job.clone()));
        }
        ctx
    }
}

fn parse_level(s: &str) -> Result<NotificationLevel, String> {
    NotificationLevel::from_str(s).map_err(|e| e.to_string())
}

fn parse_severity(s: &str) -> Result<AlertSeverity, String> {
    AlertSeverity::from_str(s).map_err(|e| e.to_string())
}

fn parse_local_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, LOCAL_TIME_FORMAT)
        .map_err(|e| format!("expected {LOCAL_TIME_FORMAT}: {e}"))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Open the store at `store_path` and run `command`, returning the JSON
/// document to print.
pub fn execute(command: &Command, store_path: &Path) -> anyhow::Result<Value> {
    let provider = JsonFileConfigProvider::open(store_path)
        .with_context(|| format!("failed to open store {}", store_path.display()))?;
    let mut service = NotificationConfigService::new(provider);

    let output = match command {
        Command::Resolve(args) => serde_json::to_value(service.resolve(&args.to_context()))?,
        Command::Inspect(args) => serde_json::to_value(service.inspect(&args.to_context()))?,
        Command::Show(key) => {
            let prefs = service
                .get_notification_preferences(key.level, &key.entity)
                .ok_or_else(|| CoreError::NotFound {
                    entity: "NotificationPreferences",
                    id: format!("{}:{}", key.level, key.entity),
                })?;
            serde_json::to_value(prefs)?
        }
        Command::List => serde_json::to_value(service.list())?,
        Command::InitUser { user } => {
            if service
                .get_notification_preferences(NotificationLevel::User, user)
                .is_some()
            {
                return Err(CoreError::Conflict(format!(
                    "User-level configuration for '{user}' already exists"
                ))
                .into());
            }
            let saved = service.save_notification_preferences(default_preferences(user))?;
            serde_json::to_value(saved)?
        }
        Command::Save { file } => {
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let prefs: NotificationPreferences = serde_json::from_str(&contents)
                .with_context(|| format!("{} is not a preference record", file.display()))?;
            validate_preferences(&prefs)?;
            serde_json::to_value(service.save_notification_preferences(prefs)?)?
        }
        Command::Override {
            from_level,
            from_entity,
            level,
            entity,
            reason,
        } => {
            let saved =
                service.create_override(*from_level, from_entity, *level, entity, reason.clone())?;
            serde_json::to_value(saved)?
        }
        Command::Delete(key) => {
            let existed = service.delete_notification_preferences(key.level, &key.entity)?;
            serde_json::json!({ "success": true, "existed": existed })
        }
        Command::Evaluate {
            context,
            alert_type,
            severity,
            at,
        } => {
            let ctx = context.to_context();
            let resolved = service.resolve(&ctx);
            let alert = AlertEvent {
                alert_type: alert_type.clone(),
                severity: *severity,
                site_id: context.site.clone(),
                asset_id: context.asset.clone(),
            };
            let local = at.unwrap_or_else(|| Utc::now().naive_utc());
            let decision = evaluate_alert(&resolved.preferences, &alert, local);
            serde_json::json!({
                "source": resolved.source,
                "decision": decision,
            })
        }
    };

    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
