//! Built-in configuration values used when no layer overrides them.

use crate::logging::LogFormat;

/// Tag name generated when no tag is requested on the command line.
pub const DEFAULT_TAG: &str = "json";

/// Case style used for the default tag.
pub const DEFAULT_CASE: &str = "camel";

/// Default log filter expression. Per-file progress is logged at `info`,
/// so a run is silent on success unless asked otherwise.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned default tag name for serde and `ortho_config` defaults.
pub fn default_tag_string() -> String {
    DEFAULT_TAG.to_owned()
}

/// Owned default case style for serde and `ortho_config` defaults.
pub fn default_case_string() -> String {
    DEFAULT_CASE.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
