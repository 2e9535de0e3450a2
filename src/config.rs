//! # Environment-driven configuration.
//!
//! Provides [`Config`], the construction-time settings consumed by the
//! `from_env`/`from_config` factories of [`FlagSet`], [`TextWriter`](crate::TextWriter)
//! and [`Logger`](crate::Logger). Nothing here is consulted after construction.
//!
//! ## Variables
//! | Variable          | Field            | Default             |
//! |-------------------|------------------|---------------------|
//! | `LOG_EVENTS`      | `flags`          | `fatal,error,info`  |
//! | `LOG_USE_COLOR`   | `use_color`      | `true`              |
//! | `LOG_SHOW_TIME`   | `show_timestamp` | `true`              |
//! | `LOG_SHOW_LABEL`  | `show_label`     | `true`              |
//! | `LOG_LABEL`       | `label`          | empty               |
//! | `LOG_TIME_FORMAT` | `time_format`    | empty (RFC 3339)    |
//!
//! ## Parsing rules
//! - `LOG_EVENTS` uses the [`FlagSet`] CSV grammar; unset or blank keeps the default.
//! - Booleans accept `1/0`, `true/false`, `yes/no`, `on/off` (case-insensitive);
//!   any other value keeps the default.

use crate::flags::FlagSet;
use crate::writers::{
    DEFAULT_TEXT_WRITER_SHOW_LABEL, DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP,
    DEFAULT_TEXT_WRITER_USE_COLOR,
};

pub const ENV_VAR_LOG_EVENTS: &str = "LOG_EVENTS";
pub const ENV_VAR_USE_COLOR: &str = "LOG_USE_COLOR";
pub const ENV_VAR_SHOW_TIMESTAMP: &str = "LOG_SHOW_TIME";
pub const ENV_VAR_SHOW_LABEL: &str = "LOG_SHOW_LABEL";
pub const ENV_VAR_LABEL: &str = "LOG_LABEL";
pub const ENV_VAR_TIME_FORMAT: &str = "LOG_TIME_FORMAT";

/// Logging configuration.
///
/// ## Field semantics
/// - `flags`: which event flags are dispatched at all
/// - `use_color`, `show_timestamp`, `show_label`: text writer columns and colors
/// - `label`: text of the label column (empty = column omitted)
/// - `time_format`: `strftime` pattern (empty = RFC 3339)
#[derive(Clone, Debug)]
pub struct Config {
    /// Dispatch filter.
    pub flags: FlagSet,
    /// Colorize text output.
    pub use_color: bool,
    /// Show the timestamp column.
    pub show_timestamp: bool,
    /// Show the label column (only when `label` is non-empty).
    pub show_label: bool,
    /// Label column text.
    pub label: String,
    /// Timestamp pattern.
    pub time_format: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults.
    ///
    /// # Example
    /// ```
    /// use fanlog::{Config, Flag};
    ///
    /// let cfg = Config::from_lookup(|key| match key {
    ///     "LOG_EVENTS" => Some("all,-debug".into()),
    ///     "LOG_USE_COLOR" => Some("off".into()),
    ///     _ => None,
    /// });
    /// assert!(cfg.flags.is_enabled(&Flag::INFO));
    /// assert!(!cfg.flags.is_enabled(&Flag::DEBUG));
    /// assert!(!cfg.use_color);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flags = match lookup(ENV_VAR_LOG_EVENTS) {
            Some(csv) if !csv.trim().is_empty() => FlagSet::from_csv(&csv),
            _ => defaults.flags,
        };

        Self {
            flags,
            use_color: parse_bool(lookup(ENV_VAR_USE_COLOR), defaults.use_color),
            show_timestamp: parse_bool(lookup(ENV_VAR_SHOW_TIMESTAMP), defaults.show_timestamp),
            show_label: parse_bool(lookup(ENV_VAR_SHOW_LABEL), defaults.show_label),
            label: lookup(ENV_VAR_LABEL).unwrap_or(defaults.label),
            time_format: lookup(ENV_VAR_TIME_FORMAT).unwrap_or(defaults.time_format),
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `flags = fatal, error, info`
    /// - `use_color = true`, `show_timestamp = true`, `show_label = true`
    /// - `label = ""`, `time_format = ""` (RFC 3339)
    fn default() -> Self {
        Self {
            flags: FlagSet::default_flags(),
            use_color: DEFAULT_TEXT_WRITER_USE_COLOR,
            show_timestamp: DEFAULT_TEXT_WRITER_SHOW_TIMESTAMP,
            show_label: DEFAULT_TEXT_WRITER_SHOW_LABEL,
            label: String::new(),
            time_format: String::new(),
        }
    }
}

impl FlagSet {
    /// Reads `LOG_EVENTS`; unset or blank yields [`FlagSet::default_flags`].
    pub fn from_env() -> Self {
        Config::from_env().flags
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
