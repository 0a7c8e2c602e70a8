//! Server configuration
//!
//! Sources, lowest priority first: built-in defaults, an optional
//! `cafe-server.toml` (or the file named by `CAFE_CONFIG`), then `CAFE_*`
//! environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cafe-server.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_address: String,
    /// SQLite file path, or `:memory:`.
    pub database_path: String,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = std::env::var("CAFE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Loads `path` if it exists, layered over defaults and under the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!("Loading configuration (file: {})", path.display());

        let settings = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("database_path", "data/cafe.db")?
            .set_default("max_connections", 5)?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("CAFE")
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Serialize environment mutations to avoid test races
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const CAFE_VARS: &[&str] = &[
        "CAFE_CONFIG",
        "CAFE_BIND_ADDRESS",
        "CAFE_DATABASE_PATH",
        "CAFE_MAX_CONNECTIONS",
    ];

    /// Runs `f` with the `CAFE_*` variables set to `vars` and all others cleared.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let saved: Vec<(&str, Option<String>)> = CAFE_VARS
            .iter()
            .map(|name| (*name, std::env::var(name).ok()))
            .collect();
        for name in CAFE_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }

        let result = f();

        for (name, value) in saved {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
        result
    }

    fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = with_env(&[], || Config::load_from(&dir.path().join("missing.toml")))
            .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.database_path, "data/cafe.db");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "cafe-server.toml",
            "bind_address = \"127.0.0.1:8080\"\ndatabase_path = \":memory:\"\n",
        );

        let config = with_env(&[], || Config::load_from(&path)).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "cafe-server.toml",
            "bind_address = \"127.0.0.1:8080\"\ndatabase_path = \"from-file.db\"\nmax_connections = 2\n",
        );

        let config = with_env(
            &[
                ("CAFE_MAX_CONNECTIONS", "9"),
                ("CAFE_DATABASE_PATH", ":memory:"),
            ],
            || Config::load_from(&path),
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.max_connections, 9);
    }

    #[test]
    fn test_cafe_config_selects_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "custom.toml",
            "bind_address = \"127.0.0.1:9090\"\nmax_connections = 3\n",
        );

        let config = with_env(&[("CAFE_CONFIG", path.to_str().unwrap())], Config::load).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9090");
        assert_eq!(config.database_path, "data/cafe.db");
        assert_eq!(config.max_connections, 3);
    }

    #[test]
    fn test_invalid_environment_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = with_env(&[("CAFE_MAX_CONNECTIONS", "many")], || {
            Config::load_from(&dir.path().join("missing.toml"))
        });

        assert!(result.is_err());
    }
}
