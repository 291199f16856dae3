// src/core/config_manager.rs
//! Configuration loading - `config.yaml` with one section per environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 10;
pub const DEFAULT_PURGE_GRACE_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// SQLite file; `:memory:` selects the in-process store
    pub database_path: PathBuf,
    pub port: u16,
    pub cache_ttl_secs: u64,
    pub purge_grace_days: i64,
    /// Interval of the background purge sweep while serving; 0 disables it
    pub cleanup_interval_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/hrdesk.db"),
            port: 8000,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            purge_grace_days: DEFAULT_PURGE_GRACE_DAYS,
            cleanup_interval_secs: 3600,
            log_file: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    pub environment: EnvironmentConfig,
    /// File the settings came from; `None` when the built-in defaults apply
    pub source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration for the active environment from `config.yaml`.
    /// Runs before logging is set up, so nothing is logged here; see `log_summary`.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yaml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment_name = Self::get_environment();

        let (environment, source) = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            (
                Self::parse(&content, &environment_name)?,
                Some(config_path.to_path_buf()),
            )
        } else {
            (EnvironmentConfig::default(), None)
        };

        let environment = EnvironmentConfig {
            database_path: Self::resolve_path(&environment.database_path)?,
            log_file: environment
                .log_file
                .as_ref()
                .map(|p| Self::resolve_path(p))
                .transpose()?,
            ..environment
        };

        Ok(Self {
            environment_name,
            environment,
            source,
        })
    }

    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => info!(
                "Loaded configuration for environment {} from {}",
                self.environment_name,
                path.display()
            ),
            None => info!(
                "No config file found, using built-in defaults for environment {}",
                self.environment_name
            ),
        }
        info!("Database: {}", self.environment.database_path.display());
    }

    fn get_environment() -> String {
        std::env::var("HRDESK_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn parse(content: &str, environment: &str) -> Result<EnvironmentConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() || path == Path::new(":memory:") {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.environment.database_path == Path::new(":memory:")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.environment.cache_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        match self.environment.cleanup_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
