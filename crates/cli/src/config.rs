use std::path::{Path, PathBuf};

use assetwatch_store::DEFAULT_STORE_FILE;

/// Output format for log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is plain text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Path of the JSON configuration store.
    pub store_path: PathBuf,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                     |
    /// |-------------------------|-----------------------------|
    /// | `ASSETWATCH_STORE_PATH` | `notification-configs.json` |
    /// | `ASSETWATCH_LOG_FORMAT` | `text`                      |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_path = lookup("ASSETWATCH_STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

        let log_format = lookup("ASSETWATCH_LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Text);

        Self {
            store_path,
            log_format,
        }
    }

    /// The store to open: a non-blank `--store` flag wins over the
    /// environment, a blank one is ignored like a blank variable.
    pub fn resolve_store_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.store_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_FILE));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn reads_overrides() {
        let config = CliConfig::from_lookup(lookup(&[
            ("ASSETWATCH_STORE_PATH", "/var/lib/assetwatch/configs.json"),
            ("ASSETWATCH_LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(
            config.store_path,
            PathBuf::from("/var/lib/assetwatch/configs.json")
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_store_path_falls_back() {
        let config = CliConfig::from_lookup(lookup(&[("ASSETWATCH_STORE_PATH", "  ")]));
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_FILE));
    }

    #[test]
    fn store_flag_overrides_environment() {
        let config =
            CliConfig::from_lookup(lookup(&[("ASSETWATCH_STORE_PATH", "/env/configs.json")]));
        assert_eq!(
            config.resolve_store_path(Some(Path::new("/flag/configs.json"))),
            PathBuf::from("/flag/configs.json")
        );
        assert_eq!(config.resolve_store_path(None), PathBuf::from("/env/configs.json"));
    }

    #[test]
    fn blank_store_flag_is_ignored() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(
            config.resolve_store_path(Some(Path::new(""))),
            PathBuf::from(DEFAULT_STORE_FILE)
        );
    }
}
