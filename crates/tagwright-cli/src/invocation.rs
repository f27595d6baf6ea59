//! Turns parsed arguments into a rewrite plan and a list of files.

use std::collections::HashSet;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use tagwright_config::Config;
use tagwright_syntax::{RewritePlan, SynthesisOptions, TagRequest};
use tracing::debug;

use crate::AppError;
use crate::cli::Cli;

const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

/// Arguments sorted into file patterns and tag request tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) patterns: Vec<String>,
    pub(crate) request_tokens: Vec<String>,
    pub(crate) remove_existing: bool,
    pub(crate) omit_empty: bool,
}

impl From<Cli> for Invocation {
    fn from(cli: Cli) -> Self {
        let (extra_patterns, request_tokens): (Vec<String>, Vec<String>) =
            cli.tokens.into_iter().partition(|token| is_pattern(token));
        let mut patterns = vec![cli.pattern];
        patterns.extend(extra_patterns);
        Self {
            patterns,
            request_tokens,
            remove_existing: cli.remove,
            omit_empty: cli.omit_empty,
        }
    }
}

/// Returns whether a positional token after the first names files rather
/// than a tag.
pub(crate) fn is_pattern(token: &str) -> bool {
    token.contains('/')
        || token.contains(MAIN_SEPARATOR)
        || token.contains(GLOB_METACHARACTERS)
        || token.ends_with(".go")
}

/// Requests resolved from the invocation, plus the tokens that failed.
#[derive(Debug, Default)]
pub(crate) struct ResolvedRequests {
    pub(crate) requests: Vec<TagRequest>,
    pub(crate) errors: Vec<AppError>,
}

impl Invocation {
    /// Parses every request token, keeping going past bad ones.
    ///
    /// With no request tokens and no removal, the configured default request
    /// is used instead.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DefaultRequest`] if the configured default tag or
    /// case style is invalid.
    pub(crate) fn resolve_requests(&self, config: &Config) -> Result<ResolvedRequests, AppError> {
        if self.request_tokens.is_empty() && !self.remove_existing {
            let request = config.default_request();
            let default = request
                .parse::<TagRequest>()
                .map_err(|source| AppError::DefaultRequest {
                    request: request.clone(),
                    source,
                })?;
            debug!(request = %default, "using default tag request");
            return Ok(ResolvedRequests {
                requests: vec![default],
                errors: Vec::new(),
            });
        }

        let mut resolved = ResolvedRequests::default();
        for token in &self.request_tokens {
            match token.parse::<TagRequest>() {
                Ok(request) => resolved.requests.push(request),
                Err(error) => resolved.errors.push(AppError::Request(error)),
            }
        }
        Ok(resolved)
    }

    /// Returns the request tokens that also name an existing path.
    ///
    /// A bare directory name such as `models` reads as a tag request; the
    /// caller warns so the operator can write `./models` instead.
    pub(crate) fn path_like_requests(&self) -> Vec<&str> {
        self.request_tokens
            .iter()
            .map(String::as_str)
            .filter(|token| Path::new(token).exists())
            .collect()
    }

    /// Builds the plan shared by every file in the run.
    pub(crate) fn plan(&self, requests: Vec<TagRequest>) -> RewritePlan {
        RewritePlan::new(requests)
            .with_remove_existing(self.remove_existing)
            .with_options(SynthesisOptions::new().with_omit_empty(self.omit_empty))
    }
}

/// Files matched by the invocation's patterns, plus the patterns that failed.
#[derive(Debug, Default)]
pub(crate) struct ExpandedFiles {
    pub(crate) files: Vec<PathBuf>,
    pub(crate) errors: Vec<AppError>,
}

/// Expands every pattern in order, dropping duplicates and directories.
pub(crate) fn expand_patterns(patterns: &[String]) -> ExpandedFiles {
    let mut expanded = ExpandedFiles::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for pattern in patterns {
        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(source) => {
                expanded.errors.push(AppError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                });
                continue;
            }
        };

        let mut matched = false;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    matched = true;
                    if seen.insert(path.clone()) {
                        expanded.files.push(path);
                    }
                }
                Ok(path) => debug!(path = %path.display(), "skipping non-file match"),
                Err(source) => {
                    matched = true;
                    expanded.errors.push(AppError::UnreadableMatch {
                        pattern: pattern.clone(),
                        source,
                    });
                }
            }
        }

        if !matched {
            expanded.errors.push(AppError::NoMatches {
                pattern: pattern.clone(),
            });
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;
    use std::fs;
    use tagwright_syntax::{CaseStyle, TagError};
    use tempfile::TempDir;

    fn invocation(args: &[&str]) -> Invocation {
        let cli = Cli::try_parse_from(std::iter::once("tagwright").chain(args.iter().copied()))
            .expect("valid arguments");
        Invocation::from(cli)
    }

    #[rstest]
    #[case("models/user.go", true)]
    #[case("*.go", true)]
    #[case("model?.txt", true)]
    #[case("[ab].go", true)]
    #[case("user.go", true)]
    #[case("json", false)]
    #[case("bson:snake", false)]
    #[case("yaml:Pascal", false)]
    fn tokens_are_classified(#[case] token: &str, #[case] pattern: bool) {
        assert_eq!(is_pattern(token), pattern);
    }

    #[test]
    fn first_positional_is_always_a_pattern() {
        let parsed = invocation(&["-o", "models", "json:snake", "extra/*.go", "db"]);
        assert_eq!(parsed.patterns, vec!["models", "extra/*.go"]);
        assert_eq!(parsed.request_tokens, vec!["json:snake", "db"]);
        assert!(parsed.omit_empty);
        assert!(!parsed.remove_existing);
    }

    #[test]
    fn missing_requests_fall_back_to_configured_default() {
        let resolved = invocation(&["user.go"])
            .resolve_requests(&Config::default())
            .expect("default request");
        assert_eq!(resolved.requests, vec![TagRequest::new("json", CaseStyle::Camel)]);
        assert!(resolved.errors.is_empty());
    }

    #[test]
    fn removal_without_requests_generates_nothing() {
        let resolved = invocation(&["-r", "user.go"])
            .resolve_requests(&Config::default())
            .expect("no requests");
        assert!(resolved.requests.is_empty());
    }

    #[test]
    fn bad_tokens_are_reported_and_skipped() {
        let resolved = invocation(&["user.go", "json:kebab", "db:snake"])
            .resolve_requests(&Config::default())
            .expect("requests");
        assert_eq!(resolved.requests, vec![TagRequest::new("db", CaseStyle::Snake)]);
        assert!(matches!(
            resolved.errors.as_slice(),
            [AppError::Request(TagError::UnknownCaseStyle { .. })]
        ));
    }

    #[test]
    fn request_tokens_naming_paths_are_flagged() {
        // Unit tests run from the package root, where `src` exists.
        let parsed = invocation(&["user.go", "src", "json"]);
        assert_eq!(parsed.request_tokens, vec!["src", "json"]);
        assert_eq!(parsed.path_like_requests(), vec!["src"]);
        assert!(invocation(&["user.go", "./src"]).path_like_requests().is_empty());
    }

    #[test]
    fn patterns_expand_in_order_without_duplicates() {
        let dir = TempDir::new().expect("temp dir");
        for name in ["b.go", "a.go", "notes.txt"] {
            fs::write(dir.path().join(name), "package m\n").expect("write");
        }
        fs::create_dir(dir.path().join("sub.go")).expect("mkdir");

        let all = format!("{}/*.go", dir.path().display());
        let single = format!("{}/b.go", dir.path().display());
        let expanded = expand_patterns(&[single, all]);

        assert!(expanded.errors.is_empty());
        assert_eq!(
            expanded.files,
            vec![dir.path().join("b.go"), dir.path().join("a.go")]
        );
    }

    #[test]
    fn unmatched_and_invalid_patterns_are_errors() {
        let dir = TempDir::new().expect("temp dir");
        let missing = format!("{}/absent.go", dir.path().display());
        let expanded = expand_patterns(&[missing, "[".to_owned()]);

        assert!(expanded.files.is_empty());
        assert!(matches!(
            expanded.errors.as_slice(),
            [AppError::NoMatches { .. }, AppError::InvalidPattern { .. }]
        ));
    }
}
