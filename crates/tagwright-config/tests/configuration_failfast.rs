use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use tagwright_config::Config;
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` in edition 2024; the guard keeps
        // overrides from racing other tests in this binary.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

#[test]
fn malformed_config_file_fails_to_load() {
    let _lock = ENV_MUTEX.lock().expect("env mutex poisoned");
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("tagwright.toml");
    fs::write(&path, "default_tag = \"json\" log_filter = ").expect("write malformed config");

    let args = vec![
        OsString::from("tagwright"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    let message = error.to_string();
    assert!(
        message.contains("tagwright.toml"),
        "expected the failing path in {message:?}"
    );
}

#[test]
fn unknown_log_format_in_environment_fails_to_load() {
    let _env = EnvOverride::set_var("TAGWRIGHT_LOG_FORMAT", OsStr::new("pretty"));

    let result = Config::load_from_iter([OsString::from("tagwright")]);

    assert!(result.is_err(), "expected rejection, got {result:?}");
}

#[test]
fn unknown_log_format_flag_fails_to_load() {
    let _lock = ENV_MUTEX.lock().expect("env mutex poisoned");
    let args = [
        OsString::from("tagwright"),
        OsString::from("--log-format"),
        OsString::from("pretty"),
    ];

    assert!(Config::load_from_iter(args).is_err());
}
