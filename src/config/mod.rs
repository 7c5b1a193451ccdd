//! Configuration module for quotes-rs
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at a settings file
pub const SETTINGS_PATH_ENV: &str = "QUOTES_SETTINGS_PATH";

/// Load settings from an explicit path, the environment, or the default
/// locations, falling back to built-in defaults.
///
/// `QUOTES_*` overrides are applied last and the result is validated.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match locate(explicit)? {
        Some(path) => {
            debug!("Loading settings from: {}", path.display());
            Settings::from_file(&path)
                .with_context(|| format!("failed to read settings from {}", path.display()))?
        }
        None => {
            debug!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

/// Find the settings file to use, if any
fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    // An explicit path must exist
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("settings file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let mut paths = vec![
        PathBuf::from("quotes.yml"),
        PathBuf::from("config/quotes.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("quotes/settings.yml"));
    }

    Ok(paths.into_iter().find(|p| p.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    const OVERRIDES: [&str; 5] = [
        SETTINGS_PATH_ENV,
        "QUOTES_BASE_URL",
        "QUOTES_TIMEOUT",
        "QUOTES_USER_AGENT",
        "QUOTES_VERIFY_SSL",
    ];

    // `load` reads the process environment, which tests share
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        clean_env_vars();
        guard
    }

    fn clean_env_vars() {
        for var in OVERRIDES {
            std::env::remove_var(var);
        }
    }

    fn settings_file(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", yaml).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_file() {
        let _env = clean_env();
        let file = settings_file("outgoing:\n  request_timeout: 3\n");

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.outgoing.request_timeout, 3.0);
    }

    #[test]
    fn test_missing_explicit_file() {
        let _env = clean_env();
        let result = load(Some(Path::new("/nonexistent/quotes.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let _env = clean_env();
        let file = settings_file("source:\n  selectors:\n    container: \"div[\"\n");

        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn test_settings_path_from_env() {
        let _env = clean_env();
        let file = settings_file("source:\n  name: staging\n");
        std::env::set_var(SETTINGS_PATH_ENV, file.path());

        let settings = load(None).unwrap();
        assert_eq!(settings.source.name, "staging");

        clean_env_vars();
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = clean_env();
        let file = settings_file("source:\n  base_url: http://127.0.0.1:9000\noutgoing:\n  request_timeout: 3\n");
        std::env::set_var("QUOTES_BASE_URL", "http://127.0.0.1:9100");
        std::env::set_var("QUOTES_TIMEOUT", "7.5");
        std::env::set_var("QUOTES_USER_AGENT", "quotes-test/2.0");
        std::env::set_var("QUOTES_VERIFY_SSL", "false");

        let settings = load(Some(file.path())).unwrap();
        assert_eq!(settings.source.base_url, "http://127.0.0.1:9100");
        assert_eq!(settings.outgoing.request_timeout, 7.5);
        assert_eq!(settings.outgoing.useragent.as_deref(), Some("quotes-test/2.0"));
        assert!(!settings.outgoing.verify_ssl);

        clean_env_vars();
    }

    #[test]
    fn test_unparsable_env_values_keep_defaults() {
        let _env = clean_env();
        std::env::set_var("QUOTES_TIMEOUT", "five");
        std::env::set_var("QUOTES_VERIFY_SSL", "sometimes");

        let mut settings = Settings::default();
        settings.merge_env();
        assert_eq!(settings.outgoing.request_timeout, crate::DEFAULT_TIMEOUT as f64);
        assert!(settings.outgoing.verify_ssl);

        clean_env_vars();
    }

    #[test]
    fn test_infinite_env_timeout_rejected() {
        let _env = clean_env();
        let file = settings_file("outgoing:\n  max_request_timeout: ~\n");
        std::env::set_var("QUOTES_TIMEOUT", "inf");

        assert!(load(Some(file.path())).is_err());

        clean_env_vars();
    }
}
