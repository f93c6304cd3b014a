//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, process environment (after loading `.env`), CLI flags (applied by
//! `main`).

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use catalog_core::{database::PoolSettings, query::TableNames};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["catalog.toml", "config/catalog.toml"];

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tables: TableNames,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool: PoolSettings,
    /// Deadline for each catalog query. `None` waits indefinitely.
    pub query_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("DATABASE_URL is not set and no database.url is configured")]
    MissingDatabaseUrl,

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Raw configuration as written in a TOML file.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub database: FileDatabaseConfig,
    pub catalog: FileCatalogConfig,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout: Option<String>,
    pub query_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileCatalogConfig {
    pub content_table: Option<String>,
    pub asset_table: Option<String>,
}

/// Configuration values taken from environment variables.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v)| !v.trim().is_empty())
                .collect(),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Load `.env`, then resolve the configuration from the process
    /// environment.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded =
            dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?;

        let mut load = self.load_with_env(&EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    pub fn load_with_env(
        &self,
        env: &EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file, config_path) = self.load_file_config(env)?;
        let mut warnings = Vec::new();

        let url = env
            .get("DATABASE_URL")
            .or(file.database.url)
            .ok_or(ConfigLoadError::MissingDatabaseUrl)?;

        let host = env
            .get("SERVER_HOST")
            .or(file.server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match env.get("SERVER_PORT") {
            Some(raw) => parse_number("SERVER_PORT", &raw)?,
            None => file.server.port.unwrap_or(3000),
        };

        let defaults = PoolSettings::default();
        let max_connections = match env.get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DATABASE_MAX_CONNECTIONS", &raw)?,
            None => file
                .database
                .max_connections
                .unwrap_or(defaults.max_connections),
        };
        let min_connections = match env.get("DATABASE_MIN_CONNECTIONS") {
            Some(raw) => parse_number("DATABASE_MIN_CONNECTIONS", &raw)?,
            None => file
                .database
                .min_connections
                .unwrap_or(defaults.min_connections),
        };
        if min_connections > max_connections {
            return Err(ConfigLoadError::InvalidValue {
                key: "DATABASE_MIN_CONNECTIONS",
                message: format!(
                    "{min_connections} exceeds max connections {max_connections}"
                ),
            });
        }

        let acquire_timeout = env
            .get("DATABASE_ACQUIRE_TIMEOUT")
            .or(file.database.acquire_timeout)
            .map(|raw| parse_duration("DATABASE_ACQUIRE_TIMEOUT", &raw))
            .transpose()?
            .unwrap_or(defaults.acquire_timeout);
        let query_timeout = env
            .get("CATALOG_QUERY_TIMEOUT")
            .or(file.database.query_timeout)
            .map(|raw| parse_duration("CATALOG_QUERY_TIMEOUT", &raw))
            .transpose()?;
        if query_timeout.is_none() {
            warnings.push(
                "CATALOG_QUERY_TIMEOUT is not set; catalog queries may block indefinitely"
                    .to_string(),
            );
        }

        let default_tables = TableNames::default();
        let content_table = env
            .get("CATALOG_CONTENT_TABLE")
            .or(file.catalog.content_table)
            .unwrap_or_else(|| default_tables.media_content().to_string());
        let asset_table = env
            .get("CATALOG_ASSET_TABLE")
            .or(file.catalog.asset_table)
            .unwrap_or_else(|| default_tables.asset().to_string());
        let tables = TableNames::new(content_table, asset_table).map_err(
            |err| ConfigLoadError::InvalidValue {
                key: "CATALOG_CONTENT_TABLE/CATALOG_ASSET_TABLE",
                message: err.to_string(),
            },
        )?;

        Ok(ConfigLoad {
            config: Config {
                server: ServerConfig { host, port },
                database: DatabaseConfig {
                    url,
                    pool: PoolSettings {
                        max_connections,
                        min_connections,
                        acquire_timeout,
                    },
                    query_timeout,
                },
                tables,
                metadata: ConfigMetadata {
                    env_file_loaded: false,
                    config_path,
                },
            },
            warnings,
        })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(FileConfig, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.get("CATALOG_CONFIG_PATH").map(PathBuf::from));

        let path = match explicit {
            Some(path) => Some(path),
            None => DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.is_file()),
        };

        match path {
            Some(path) => Ok((read_file_config(&path)?, Some(path))),
            None => Ok((FileConfig::default(), None)),
        }
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigLoadError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigLoadError::InvalidValue {
            key,
            message: err.to_string(),
        })
}

fn parse_duration(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|err| {
        ConfigLoadError::InvalidValue {
            key,
            message: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        EnvConfig::from_vars(pairs.iter().map(|(k, v)| (*k, *v)))
    }

    fn loader_without_file() -> ConfigLoader {
        ConfigLoader::new().with_config_path("/nonexistent/catalog.toml")
    }

    #[test]
    fn database_url_is_required() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[server]\nport = 8080").expect("write config");

        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(&EnvConfig::default())
            .expect_err("url must be required");
        assert!(matches!(err, ConfigLoadError::MissingDatabaseUrl));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let err = loader_without_file()
            .load_with_env(&env(&[("DATABASE_URL", "postgres://db/catalog")]))
            .expect_err("file must exist");
        assert!(matches!(err, ConfigLoadError::Read { .. }));
    }

    #[test]
    fn file_values_are_overridden_by_environment() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
url = "postgres://file/catalog"
max_connections = 4
query_timeout = "2s"

[catalog]
content_table = "vod.content"
"#
        )
        .expect("write config");

        let load = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(&env(&[
                ("SERVER_PORT", "9090"),
                ("CATALOG_ASSET_TABLE", "vod.assets"),
            ]))
            .expect("config");
        let config = load.config;

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "postgres://file/catalog");
        assert_eq!(config.database.pool.max_connections, 4);
        assert_eq!(config.database.query_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.tables.media_content(), "vod.content");
        assert_eq!(config.tables.asset(), "vod.assets");
        assert!(load.warnings.is_empty());
        assert_eq!(config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn invalid_table_name_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[database]\nurl = \"postgres://x/y\"").expect("write");

        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(&env(&[("CATALOG_CONTENT_TABLE", "content; --")]))
            .expect_err("identifier must be rejected");
        assert!(matches!(err, ConfigLoadError::InvalidValue { .. }));
    }

    #[test]
    fn unset_query_timeout_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[database]\nurl = \"postgres://x/y\"").expect("write");

        let load = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(&EnvConfig::default())
            .expect("config");

        let config = load.config;
        assert_eq!(config.database.query_timeout, None);
        assert_eq!(config.server.port, 3000);
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn malformed_durations_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[database]\nurl = \"postgres://x/y\"").expect("write");

        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(&env(&[("CATALOG_QUERY_TIMEOUT", "soon")]))
            .expect_err("duration must be rejected");
        assert!(matches!(
            err,
            ConfigLoadError::InvalidValue {
                key: "CATALOG_QUERY_TIMEOUT",
                ..
            }
        ));
    }
}
