//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events; binaries and tests decide
//! where they go. [`LoggingConfig::init`] installs a global fmt subscriber
//! with an [`EnvFilter`](tracing_subscriber::EnvFilter), in human-readable
//! text or one-JSON-object-per-line form.
//!
//! # Environment
//!
//! | Variable            | Meaning                        | Default |
//! |---------------------|--------------------------------|---------|
//! | `MARGIN_LOG`        | `EnvFilter` directive string   | `info`  |
//! | `MARGIN_LOG_FORMAT` | `text` or `json`               | `text`  |

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_FILTER_ENV: &str = "MARGIN_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "MARGIN_LOG_FORMAT";

/// Output format for the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(Self::Text),
            "json" | "jsonl" => Ok(Self::Json),
            other => Err(LoggingInitError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors from subscriber installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingInitError {
    /// `MARGIN_LOG_FORMAT` (or an explicit string) named no known format.
    UnknownFormat(String),
    /// The filter directives did not parse.
    InvalidFilter(String),
    /// A global subscriber is already installed.
    AlreadyInitialized(String),
}

impl fmt::Display for LoggingInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFormat(name) => write!(f, "unknown log format {name:?}"),
            Self::InvalidFilter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::AlreadyInitialized(msg) => write!(f, "tracing subscriber already set: {msg}"),
        }
    }
}

impl std::error::Error for LoggingInitError {}

/// Subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    filter: String,
    format: LogFormat,
    with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `EnvFilter` directives (e.g. `margin_runtime=debug`).
    #[must_use]
    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = directives.into();
        self
    }

    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Include the event target (module path) in output.
    #[must_use]
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    #[must_use]
    pub fn filter_directives(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.format
    }

    /// Build from `MARGIN_LOG` / `MARGIN_LOG_FORMAT`.
    ///
    /// Unset or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|value| !value.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|value| value.parse().ok()) {
            config.format = format;
        }
        config
    }

    /// Install the global subscriber.
    ///
    /// Fails if the filter does not parse or a subscriber already exists;
    /// the existing subscriber is left in place in that case.
    pub fn init(&self) -> Result<(), LoggingInitError> {
        let filter = EnvFilter::try_new(&self.filter)
            .map_err(|err| LoggingInitError::InvalidFilter(err.to_string()))?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.with_target);
        let installed = match self.format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        installed.map_err(|err| LoggingInitError::AlreadyInitialized(err.to_string()))?;
        tracing::debug!(filter = %self.filter, format = ?self.format, "tracing subscriber installed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Text ".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(LoggingInitError::UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn from_lookup_defaults() {
        let config = LoggingConfig::from_lookup(|_| None);
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.filter_directives(), "info");
    }

    #[test]
    fn from_lookup_overrides() {
        let config = LoggingConfig::from_lookup(lookup_from(&[
            (LOG_FILTER_ENV, "margin_runtime=debug"),
            (LOG_FORMAT_ENV, "json"),
        ]));
        assert_eq!(config.filter_directives(), "margin_runtime=debug");
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn from_lookup_ignores_bad_values() {
        let config = LoggingConfig::from_lookup(lookup_from(&[
            (LOG_FILTER_ENV, "   "),
            (LOG_FORMAT_ENV, "yaml"),
        ]));
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn builder_chain() {
        let config = LoggingConfig::new()
            .filter("warn")
            .format(LogFormat::Json)
            .with_target(false);
        assert_eq!(config.filter_directives(), "warn");
        assert_eq!(config.log_format(), LogFormat::Json);
    }
}
