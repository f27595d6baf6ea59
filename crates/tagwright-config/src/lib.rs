//! Layered configuration for the tagwright binary.
//!
//! Values are merged by `ortho_config` from, in increasing precedence:
//! built-in defaults, a TOML file named by `--config-path` or
//! `TAGWRIGHT_CONFIG_PATH`, `TAGWRIGHT_*` environment variables, and the
//! configuration flags on the command line.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CASE, DEFAULT_LOG_FILTER, DEFAULT_TAG, default_case_string,
    default_log_filter_string, default_log_format, default_tag_string,
};
pub use logging::LogFormat;

/// Resolved configuration shared by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TAGWRIGHT")]
pub struct Config {
    /// Tag name generated when no tag is requested explicitly.
    #[serde(default = "defaults::default_tag_string")]
    #[ortho_config(default = defaults::default_tag_string())]
    pub default_tag: String,
    /// Case style of the default tag (`snake`, `camel` or `pascal`).
    #[serde(default = "defaults::default_case_string")]
    #[ortho_config(default = defaults::default_case_string())]
    pub default_case: String,
    /// `tracing` filter expression applied to the subscriber.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log events.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Tag name used when the command line names no tag.
    #[must_use]
    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }

    /// Case style name used for the default tag.
    ///
    /// The value is validated when the default request is built, so an
    /// unknown style surfaces as an ordinary request error.
    #[must_use]
    pub fn default_case(&self) -> &str {
        &self.default_case
    }

    /// The default request in `tag:case` token form.
    #[must_use]
    pub fn default_request(&self) -> String {
        format!("{}:{}", self.default_tag, self.default_case)
    }

    /// Log filter expression for the subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_tag: default_tag_string(),
            default_case: default_case_string(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}
