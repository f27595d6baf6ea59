//! Tests for the CLI runtime.
//!
//! A [`StaticConfigLoader`] stands in for `ortho_config` so the runtime can
//! be driven without touching the process environment.


use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use rstest::{fixture, rstest};
use tagwright_config::Config;
use tempfile::TempDir;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// A config loader that returns a fixed configuration and records the
/// arguments it was given.
struct StaticConfigLoader {
    config: Config,
    seen: RefCell<Vec<OsString>>,
}

impl StaticConfigLoader {
    fn new(config: Config) -> Self {
        Self {
            config,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.replace(args.to_vec());
        Ok(self.config.clone())
    }
}

/// Test world holding configuration, a scratch directory and captured output.
#[derive(Default)]
pub(super) struct TestWorld {
    pub config: Config,
    pub temp_dir: Option<TempDir>,
    pub originals: HashMap<String, String>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<ExitCode>,
}

impl TestWorld {
    fn dir(&mut self) -> PathBuf {
        self.temp_dir
            .get_or_insert_with(|| TempDir::new().expect("temp dir"))
            .path()
            .to_path_buf()
    }

    pub fn write_file(&mut self, name: &str, contents: &str) {
        fs::write(self.dir().join(name), contents).expect("write source");
        self.originals.insert(name.to_owned(), contents.to_owned());
    }

    pub fn read_file(&mut self, name: &str) -> String {
        fs::read_to_string(self.dir().join(name)).expect("read source")
    }

    pub fn original(&self, name: &str) -> &str {
        self.originals
            .get(name)
            .map(String::as_str)
            .expect("file was written by a step")
    }

    /// Runs the CLI, resolving file-like tokens against the scratch
    /// directory.
    pub fn run(&mut self, command: &str) {
        let dir = self.dir();
        let args = std::iter::once(OsString::from("tagwright")).chain(
            command.split_whitespace().map(|token| {
                if token.ends_with(".go") || token.contains('*') {
                    dir.join(token).into_os_string()
                } else {
                    OsString::from(token)
                }
            }),
        );
        self.stdout.clear();
        self.stderr.clear();
        let loader = StaticConfigLoader::new(self.config.clone());
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        self.exit_code = Some(run_with_loader(args, &mut io, &loader));
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout utf8")
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("stderr utf8")
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn run_captured(args: &[&str], loader: &StaticConfigLoader) -> (ExitCode, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with_loader(args.iter().map(OsString::from), &mut io, loader)
    };
    (
        exit,
        String::from_utf8(stdout).expect("stdout utf8"),
        String::from_utf8(stderr).expect("stderr utf8"),
    )
}

#[rstest]
#[case("--help")]
#[case("--version")]
fn help_and_version_go_to_stdout(#[case] flag: &str) {
    let loader = StaticConfigLoader::new(Config::default());
    let (exit, stdout, stderr) = run_captured(&["tagwright", flag], &loader);

    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(stdout.contains("tagwright"), "stdout was {stdout:?}");
    assert!(stderr.is_empty());
}

#[test]
fn missing_pattern_is_a_usage_error() {
    let loader = StaticConfigLoader::new(Config::default());
    let (exit, stdout, stderr) = run_captured(&["tagwright", "-r"], &loader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(stdout.is_empty());
    assert!(stderr.contains("PATTERN"), "stderr was {stderr:?}");
}

#[test]
fn leading_config_flags_reach_the_loader() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("user.go");
    fs::write(&path, "package m\n\ntype User struct {\n\tName string\n}\n").expect("write");
    let path_text = path.to_string_lossy().into_owned();

    let loader = StaticConfigLoader::new(Config::default());
    let (exit, _, stderr) = run_captured(
        &["tagwright", "--log-filter=debug", "--default-tag", "yaml", &path_text],
        &loader,
    );

    assert_eq!(exit, ExitCode::SUCCESS, "stderr was {stderr:?}");
    assert_eq!(
        loader.seen.borrow().as_slice(),
        ["tagwright", "--log-filter=debug", "--default-tag", "yaml"]
            .map(OsString::from)
            .as_slice()
    );
}

#[test]
fn invalid_configured_default_aborts_before_rewriting() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("user.go");
    let source = "package m\n\ntype User struct {\n\tName string\n}\n";
    fs::write(&path, source).expect("write");
    let path_text = path.to_string_lossy().into_owned();

    let config = Config {
        default_case: "kebab".to_owned(),
        ..Config::default()
    };
    let loader = StaticConfigLoader::new(config);
    let (exit, _, stderr) = run_captured(&["tagwright", &path_text], &loader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(stderr.contains("from configuration"), "stderr was {stderr:?}");
    assert_eq!(fs::read_to_string(&path).expect("read back"), source);
}

#[test]
fn request_token_naming_a_directory_is_warned_about() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("user.go");
    fs::write(&path, "package m\n\ntype User struct {\n\tName string\n}\n").expect("write");
    let path_text = path.to_string_lossy().into_owned();

    // The package root is the working directory, so `src` exists.
    let loader = StaticConfigLoader::new(Config::default());
    let (exit, _, stderr) = run_captured(&["tagwright", &path_text, "src"], &loader);

    assert_eq!(exit, ExitCode::SUCCESS, "stderr was {stderr:?}");
    assert!(stderr.contains("'src' names an existing path"), "stderr was {stderr:?}");
    assert!(fs::read_to_string(&path).expect("read back").contains("`src:\"name\"`"));
}
