use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::migrator_info;
use migrator_core::{JobCatalog, JobCatalogs, JobCategory};
use migrator_engine::{ClientSettings, GroupKeyField};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "migrator.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("config file {path:?}: `{field}` must be greater than zero")]
    ZeroInterval { path: PathBuf, field: &'static str },
}

/// On-disk console settings, stored as RON. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub log_interval_ms: u64,
    pub job_poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub staged_group_key: GroupKeyField,
    pub listing_jobs: Vec<String>,
    pub migration_jobs: Vec<String>,
    /// `None` keeps logs on the terminal only.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            base_url: settings.base_url,
            log_interval_ms: duration_ms(settings.log_interval),
            job_poll_interval_ms: duration_ms(settings.job_poll_interval),
            connect_timeout_ms: duration_ms(settings.connect_timeout),
            request_timeout_ms: settings.request_timeout.map(duration_ms),
            staged_group_key: settings.staged_group_key,
            listing_jobs: settings.catalogs.listing.names().to_vec(),
            migration_jobs: settings.catalogs.migration.names().to_vec(),
            log_file: Some(PathBuf::from(crate::logging::DEFAULT_LOG_FILE)),
        }
    }
}

impl AppConfig {
    /// First polling interval set to zero, if any.
    fn zero_interval(&self) -> Option<&'static str> {
        [
            ("log_interval_ms", self.log_interval_ms),
            ("job_poll_interval_ms", self.job_poll_interval_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0)
        .map(|(field, _)| field)
    }

    pub fn to_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            log_interval: Duration::from_millis(self.log_interval_ms),
            job_poll_interval: Duration::from_millis(self.job_poll_interval_ms),
            staged_group_key: self.staged_group_key,
            catalogs: JobCatalogs {
                listing: JobCatalog::new(JobCategory::Listing, self.listing_jobs.iter().cloned()),
                migration: JobCatalog::new(
                    JobCategory::Migration,
                    self.migration_jobs.iter().cloned(),
                ),
            },
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Loads the config at `path`, or the default file when `path` is `None`.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return Ok(AppConfig::default());
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };

    let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    if let Some(field) = config.zero_interval() {
        return Err(ConfigError::ZeroInterval { path, field });
    }
    migrator_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("console.ron");
        fs::write(
            &path,
            r#"(base_url: "https://migrate.example.com/", staged_group_key: path, log_interval_ms: 250)"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.base_url, "https://migrate.example.com/");
        assert_eq!(config.staged_group_key, GroupKeyField::Path);
        assert_eq!(config.log_interval_ms, 250);
        assert_eq!(config.job_poll_interval_ms, 2000);
        assert_eq!(config.listing_jobs, AppConfig::default().listing_jobs);
        assert_eq!(config.log_file, Some(PathBuf::from("./migrator.log")));
    }

    #[test]
    fn log_file_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("quiet.ron");
        fs::write(&path, "(log_file: None)").unwrap();

        assert_eq!(load_config(Some(&path)).unwrap().log_file, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let temp = TempDir::new().unwrap();
        for (content, expected) in [
            ("(log_interval_ms: 0)", "log_interval_ms"),
            ("(job_poll_interval_ms: 0)", "job_poll_interval_ms"),
        ] {
            let path = temp.path().join("zero.ron");
            fs::write(&path, content).unwrap();

            match load_config(Some(&path)) {
                Err(ConfigError::ZeroInterval { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected zero interval error, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(base_url: 42").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn settings_carry_custom_catalog_order() {
        let config = AppConfig {
            migration_jobs: vec!["b".to_string(), "a".to_string()],
            request_timeout_ms: Some(1500),
            ..AppConfig::default()
        };
        let settings = config.to_settings();
        assert_eq!(settings.catalogs.migration.names().to_vec(), vec!["b", "a"]);
        assert_eq!(settings.request_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(settings.log_interval, Duration::from_millis(1000));
    }
}
