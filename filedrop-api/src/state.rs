//! App state and environment configuration.

use std::path::PathBuf;

use filedrop_core::constants::{DEFAULT_FILES_PATH, DEFAULT_SUBSCRIPTIONS_PATH, INLINE_PAGE_SIZE};
use filedrop_core::error::{FiledropError, Result};
use filedrop_core::types::SubscriberId;
use filedrop_search::{FileDrop, FileDropConfig};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Path of the append-only file log
    pub files_path: PathBuf,
    /// Path of the subscription snapshot
    pub subscriptions_path: PathBuf,
    /// Service settings
    pub service: FileDropConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            files_path: DEFAULT_FILES_PATH.into(),
            subscriptions_path: DEFAULT_SUBSCRIPTIONS_PATH.into(),
            service: FileDropConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Reads configuration from the environment, loading `.env` first.
    ///
    /// | variable | default |
    /// |---|---|
    /// | `FILEDROP_FILES` | `files.txt` |
    /// | `FILEDROP_SUBSCRIPTIONS` | `announce.json` |
    /// | `FILEDROP_SOURCES` | none |
    /// | `FILEDROP_ADMINS` | none |
    /// | `FILEDROP_PAGE_SIZE` | `20` |
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let page_size = match var("FILEDROP_PAGE_SIZE") {
            Some(v) => v.trim().parse::<usize>().map_err(|_| {
                FiledropError::ConfigError(format!("FILEDROP_PAGE_SIZE is not a number: {:?}", v))
            })?,
            None => INLINE_PAGE_SIZE,
        };

        let service = FileDropConfig::default()
            .with_sources(parse_ids("FILEDROP_SOURCES", var("FILEDROP_SOURCES"))?)
            .with_admins(parse_ids("FILEDROP_ADMINS", var("FILEDROP_ADMINS"))?)
            .with_page_size(page_size);

        Ok(Self {
            files_path: var("FILEDROP_FILES")
                .unwrap_or_else(|| DEFAULT_FILES_PATH.into())
                .into(),
            subscriptions_path: var("FILEDROP_SUBSCRIPTIONS")
                .unwrap_or_else(|| DEFAULT_SUBSCRIPTIONS_PATH.into())
                .into(),
            service,
        })
    }
}

/// Parses a comma-separated list of chat ids.
fn parse_ids(name: &str, value: Option<String>) -> Result<Vec<SubscriberId>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<SubscriberId>()
                .map_err(|_| FiledropError::ConfigError(format!("{} has an invalid id: {:?}", name, s)))
        })
        .collect()
}

/// Shared handler state.
pub struct AppState {
    /// The FileDrop service
    pub service: FileDrop,
}

impl AppState {
    /// Wraps an existing service.
    pub fn new(service: FileDrop) -> Self {
        Self { service }
    }

    /// Opens the service on the paths in `config`.
    pub async fn open(config: &ApiConfig) -> Result<Self> {
        let service = FileDrop::open(
            &config.files_path,
            &config.subscriptions_path,
            config.service.clone(),
        )
        .await?;
        Ok(Self::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.files_path, PathBuf::from("files.txt"));
        assert_eq!(config.subscriptions_path, PathBuf::from("announce.json"));
        assert_eq!(config.service, FileDropConfig::default());
    }

    #[test]
    fn test_reads_variables() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("FILEDROP_FILES", "/data/files.txt"),
            ("FILEDROP_SOURCES", "1, 2,,3"),
            ("FILEDROP_ADMINS", "-100"),
            ("FILEDROP_PAGE_SIZE", "5"),
        ]))
        .unwrap();

        assert_eq!(config.files_path, PathBuf::from("/data/files.txt"));
        assert_eq!(config.service.sources, vec![1, 2, 3]);
        assert_eq!(config.service.admins, vec![-100]);
        assert_eq!(config.service.page_size, 5);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = ApiConfig::from_lookup(lookup(&[("FILEDROP_SOURCES", "1,abc")])).unwrap_err();
        assert!(matches!(err, FiledropError::ConfigError(_)));

        let err = ApiConfig::from_lookup(lookup(&[("FILEDROP_PAGE_SIZE", "many")])).unwrap_err();
        assert!(matches!(err, FiledropError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            files_path: dir.path().join("files.txt"),
            subscriptions_path: dir.path().join("announce.json"),
            service: FileDropConfig::default(),
        };

        let state = AppState::open(&config).await.unwrap();
        assert!(state.service.files().is_empty());
        assert!(state.service.subscriptions().is_empty());
    }
}
