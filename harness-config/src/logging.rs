//! Tracing subscriber setup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Plain,
        }
    }
}

/// HTTP client crates log every connection at debug; keep them at `warn`
/// unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "reqwest", "mio", "want"];

fn default_directives(level: &str) -> String {
    std::iter::once(level.to_string())
        .chain(QUIET_DEPENDENCIES.iter().map(|target| format!("{target}=warn")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. Later calls are no-ops, so tests may
/// call this freely.
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let builder = fmt().with_env_filter(env_filter).with_test_writer();
    let _ = match config.format {
        LogFormat::Plain => builder.with_target(true).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Quiet subscriber for test binaries.
pub fn init_for_tests() {
    init(&LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Plain,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_crates_stay_quiet_at_debug() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("hyper=warn"));
        assert!(directives.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn level_is_parsed_from_config() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }
}
