//! Configuration loading helpers for the tagwright CLI.
//!
//! Leading configuration flags are routed to `ortho_config` so the loader
//! only sees options it understands, while clap parses the remaining
//! patterns and tag requests.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use tagwright_config::Config;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `tagwright_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--default-tag",
    "--default-case",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the CLI.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags must appear before the first pattern. Anything
    /// after that point is parsed as a pattern, a tag request or a rewrite
    /// flag.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }

    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the leading configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Index of the first argument meant for clap.
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut consumed = 0usize;
    let mut pending_value = false;

    for argument in rest {
        if pending_value {
            pending_value = false;
        } else {
            match classify_flag(argument) {
                FlagAction::Include { needs_value } => pending_value = needs_value,
                FlagAction::Stop => break,
            }
        }
        config_arguments.push(argument.clone());
        consumed = consumed.saturating_add(1);
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start: consumed.saturating_add(1),
    }
}

/// Rebuilds the argument list clap sees: the program name and everything
/// after the configuration flags.
pub(crate) fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--log-filter", FlagAction::Include { needs_value: true })]
    #[case("--default-tag", FlagAction::Include { needs_value: true })]
    #[case("models.go", FlagAction::Stop)]
    #[case("--remove", FlagAction::Stop)]
    #[case("-r", FlagAction::Stop)]
    fn flags_are_classified(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify_flag(OsStr::new(argument)), expected);
    }

    #[test]
    fn leading_config_flags_are_split_off() {
        let args = os_args(&[
            "tagwright",
            "--default-tag",
            "yaml",
            "--log-format=json",
            "-r",
            "models.go",
            "json:snake",
        ]);
        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os_args(&["tagwright", "--default-tag", "yaml", "--log-format=json"])
        );
        assert_eq!(split.command_start, 4);
        assert_eq!(
            prepare_cli_arguments(&args, &split),
            os_args(&["tagwright", "-r", "models.go", "json:snake"])
        );
    }

    #[test]
    fn config_flags_after_a_pattern_stay_with_the_command() {
        let args = os_args(&["tagwright", "models.go", "--default-tag", "yaml"]);
        let split = split_config_arguments(&args);

        assert_eq!(split.config_arguments, os_args(&["tagwright"]));
        assert_eq!(prepare_cli_arguments(&args, &split), args);
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert!(prepare_cli_arguments(&[], &split).is_empty());
    }
}
