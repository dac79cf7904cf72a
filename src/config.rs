//! Configuration loading and per-connection settings.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-renderer.toml` in current directory
//! 4. `~/.config/sql-renderer/config.toml`
//! 5. Default values
//!
//! The loaded [`Config`] is an ordinary value: build it once and pass it to
//! whatever needs connection settings. Nothing is cached process-wide.
//!
//! # Configuration File Format
//!
//! ```toml
//! active = "default"
//!
//! [orm]
//! metadata_path = "src/Entity"
//! proxy_dir = "var/proxies"
//! proxy_namespace = "Proxies"
//! cache_driver = "array"          # array, apc, xcache, wincache, zend, none
//! metadata_driver = "annotation"  # annotation, php, xml, yaml, simplified_xml, simplified_yaml
//!
//! [connections.default]
//! type = "mysql"                  # mysql, mysqli, pdo
//! charset = "utf8mb4"
//! profiling = true
//!
//! [connections.default.connection]
//! hostname = "localhost"
//! database = "app"
//! username = "app"
//!
//! [connections.reporting]
//! type = "pdo"
//! connection = { dsn = "pgsql:host=replica;dbname=reports" }
//! orm = { proxy_dir = "var/report-proxies" }
//!
//! [render]
//! dialect = "mysql"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_RENDERER_CONNECTION` | Active connection name |
//! | `SQL_RENDERER_DIALECT` | Default quoting dialect |
//! | `SQL_RENDERER_LOG` | Log level |

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{AppError, AppResult, config_error},
    logger::QueryLogger,
    profiler::TimingSink,
    query::SqlDialect,
    quote::ValueQuoter
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection used when none is named
    #[serde(default = "default_active")]
    pub active:      String,
    /// ORM settings shared by all connections
    #[serde(default)]
    pub orm:         Option<OrmConfig>,
    #[serde(default)]
    pub connections: IndexMap<String, ConnectionConfig>,
    #[serde(default)]
    pub render:      RenderConfig,
    #[serde(default)]
    pub logging:     LoggingConfig
}

fn default_active() -> String {
    String::from("default")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active:      default_active(),
            orm:         None,
            connections: IndexMap::new(),
            render:      RenderConfig::default(),
            logging:     LoggingConfig::default()
        }
    }
}

/// Rendering defaults
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RenderConfig {
    pub dialect: Option<SqlDialect>
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("warn")
        }
    }
}

/// Metadata/query cache implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDriver {
    #[default]
    Array,
    Apc,
    Xcache,
    Wincache,
    Zend,
    /// No metadata or query cache
    #[serde(alias = "")]
    None
}

impl CacheDriver {
    pub fn is_enabled(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for CacheDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array => write!(f, "array"),
            Self::Apc => write!(f, "apc"),
            Self::Xcache => write!(f, "xcache"),
            Self::Wincache => write!(f, "wincache"),
            Self::Zend => write!(f, "zend"),
            Self::None => write!(f, "none")
        }
    }
}

/// Mapping metadata reader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataDriver {
    #[default]
    Annotation,
    Php,
    SimplifiedXml,
    SimplifiedYaml,
    Xml,
    Yaml
}

impl MetadataDriver {
    /// File suffix of mapping files read by this driver
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Annotation | Self::Php => ".php",
            Self::SimplifiedXml => ".orm.xml",
            Self::SimplifiedYaml => ".orm.yml",
            Self::Xml => ".dcm.xml",
            Self::Yaml => ".dcm.yml"
        }
    }
}

impl fmt::Display for MetadataDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotation => write!(f, "annotation"),
            Self::Php => write!(f, "php"),
            Self::SimplifiedXml => write!(f, "simplified_xml"),
            Self::SimplifiedYaml => write!(f, "simplified_yaml"),
            Self::Xml => write!(f, "xml"),
            Self::Yaml => write!(f, "yaml")
        }
    }
}

/// ORM settings as written in the file; every key may be overridden per
/// connection
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrmConfig {
    pub metadata_path:               Option<PathBuf>,
    pub proxy_dir:                   Option<PathBuf>,
    pub proxy_namespace:             Option<String>,
    pub auto_generate_proxy_classes: Option<bool>,
    pub cache_driver:                Option<CacheDriver>,
    pub metadata_driver:             Option<MetadataDriver>
}

impl OrmConfig {
    /// Keys set in `overrides` replace ours
    pub fn merged(&self, overrides: &OrmConfig) -> OrmConfig {
        OrmConfig {
            metadata_path:               overrides
                .metadata_path
                .clone()
                .or_else(|| self.metadata_path.clone()),
            proxy_dir:                   overrides
                .proxy_dir
                .clone()
                .or_else(|| self.proxy_dir.clone()),
            proxy_namespace:             overrides
                .proxy_namespace
                .clone()
                .or_else(|| self.proxy_namespace.clone()),
            auto_generate_proxy_classes: overrides
                .auto_generate_proxy_classes
                .or(self.auto_generate_proxy_classes),
            cache_driver:                overrides.cache_driver.or(self.cache_driver),
            metadata_driver:             overrides.metadata_driver.or(self.metadata_driver)
        }
    }

    fn resolve(self, connection: &str) -> AppResult<OrmSettings> {
        let missing = |key: &str| {
            config_error(format!(
                "'{}' not configured for connection '{}'",
                key, connection
            ))
        };
        Ok(OrmSettings {
            metadata_path:               self.metadata_path.ok_or_else(|| missing("metadata_path"))?,
            proxy_dir:                   self.proxy_dir.ok_or_else(|| missing("proxy_dir"))?,
            proxy_namespace:             self
                .proxy_namespace
                .ok_or_else(|| missing("proxy_namespace"))?,
            auto_generate_proxy_classes: self.auto_generate_proxy_classes.unwrap_or(false),
            cache_driver:                self.cache_driver.unwrap_or_default(),
            metadata_driver:             self.metadata_driver.unwrap_or_default()
        })
    }
}

/// Fully resolved ORM settings of one connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrmSettings {
    pub metadata_path:               PathBuf,
    pub proxy_dir:                   PathBuf,
    pub proxy_namespace:             String,
    pub auto_generate_proxy_classes: bool,
    pub cache_driver:                CacheDriver,
    pub metadata_driver:             MetadataDriver
}

/// Connection description style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[serde(alias = "mysqli")]
    Mysql,
    Pdo
}

/// One `[connections.<name>]` table
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConnectionConfig {
    #[serde(rename = "type")]
    pub kind:       Option<ConnectionType>,
    pub connection: Option<IndexMap<String, toml::Value>>,
    pub charset:    Option<String>,
    #[serde(default)]
    pub profiling:  bool,
    pub orm:        Option<OrmConfig>
}

/// Database driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    PdoMysql,
    PdoSqlite,
    PdoPgsql,
    PdoOci,
    PdoSqlsrv
}

impl Driver {
    /// Driver for a PDO DSN prefix such as `mysql` or `pgsql`
    pub fn from_dsn_prefix(prefix: &str) -> AppResult<Self> {
        match prefix {
            "mysql" => Ok(Self::PdoMysql),
            "sqlite" => Ok(Self::PdoSqlite),
            "pgsql" => Ok(Self::PdoPgsql),
            "oci" => Ok(Self::PdoOci),
            "sqlsrv" => Ok(Self::PdoSqlsrv),
            other => Err(config_error(format!("Unsupported driver '{}'", other)))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdoMysql => "pdo_mysql",
            Self::PdoSqlite => "pdo_sqlite",
            Self::PdoPgsql => "pdo_pgsql",
            Self::PdoOci => "pdo_oci",
            Self::PdoSqlsrv => "pdo_sqlsrv"
        }
    }

    /// Quoting dialect for literals sent to this driver
    pub fn dialect(self) -> SqlDialect {
        match self {
            Self::PdoMysql => SqlDialect::MySQL,
            Self::PdoSqlite => SqlDialect::SQLite,
            Self::PdoPgsql => SqlDialect::PostgreSQL,
            Self::PdoOci | Self::PdoSqlsrv => SqlDialect::Generic
        }
    }
}

impl FromStr for Driver {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dsn_prefix(s.strip_prefix("pdo_").unwrap_or(s))
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver plus its connection parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverOptions {
    pub driver: Driver,
    pub params: IndexMap<String, String>
}

impl DriverOptions {
    /// Copy with credentials masked, for display
    pub fn redacted(&self) -> Self {
        let params = self
            .params
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("password") {
                    (k.clone(), String::from("***"))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect();
        Self {
            driver: self.driver,
            params
        }
    }
}

/// Everything needed to set up one connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionSettings {
    pub name:      String,
    pub driver:    DriverOptions,
    pub orm:       OrmSettings,
    pub profiling: bool
}

impl ConnectionSettings {
    pub fn dialect(&self) -> SqlDialect {
        self.driver.driver.dialect()
    }

    /// Query logger for this connection, or `None` when profiling is off
    pub fn query_logger<Q: ValueQuoter, S: TimingSink>(
        &self,
        quoter: Q,
        sink: S
    ) -> Option<QueryLogger<Q, S>> {
        self.profiling.then(|| QueryLogger::new(&self.name, quoter, sink))
    }
}

fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string()
    }
}

fn raw_str<'a>(raw: &'a IndexMap<String, toml::Value>, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(toml::Value::as_str)
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-renderer.toml)
    /// 3. Config file in home directory (~/.config/sql-renderer/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-renderer")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-renderer.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env()?;
        Ok(config)
    }

    /// Load a specific file, then apply environment overrides
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        debug!(path = %path.display(), "loading config file");
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration text. Unknown cache/metadata drivers and
    /// connection types are rejected here rather than on first use.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    fn apply_env(&mut self) -> AppResult<()> {
        if let Ok(connection) = env::var("SQL_RENDERER_CONNECTION") {
            self.active = connection;
        }

        if let Ok(dialect) = env::var("SQL_RENDERER_DIALECT") {
            self.render.dialect = Some(dialect.parse()?);
        }

        if let Ok(level) = env::var("SQL_RENDERER_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Settings for `name`, or for the active connection
    pub fn resolve_connection(&self, name: Option<&str>) -> AppResult<ConnectionSettings> {
        self.connection_settings(name.unwrap_or(&self.active))
    }

    /// Merge shared and per-connection settings and translate the
    /// connection description into driver options.
    pub fn connection_settings(&self, name: &str) -> AppResult<ConnectionSettings> {
        let conn = self.connections.get(name).ok_or_else(|| {
            config_error(format!("No connection configuration for '{}'", name))
        })?;
        let raw = conn.connection.as_ref().ok_or_else(|| {
            config_error(format!("No connection configuration for '{}'", name))
        })?;
        let shared = self
            .orm
            .as_ref()
            .ok_or_else(|| config_error("Missing [orm] section in config"))?;
        let orm = match &conn.orm {
            Some(overrides) => shared.merged(overrides),
            None => shared.clone()
        }
        .resolve(name)?;

        let mut params: IndexMap<String, String> = IndexMap::new();
        let mut driver: Option<Driver> = None;
        match conn.kind {
            Some(ConnectionType::Mysql) => {
                let mut put = |key: &str, source: &str| {
                    if let Some(value) = raw_str(raw, source) {
                        params.insert(key.to_string(), value.to_string());
                    }
                };
                put("user", "username");
                put("host", "hostname");
                put("dbname", "database");
                driver = Some(Driver::PdoMysql);
            }
            Some(ConnectionType::Pdo) => {
                if let Some(user) = raw_str(raw, "username") {
                    params.insert("user".to_string(), user.to_string());
                }
                let dsn = raw_str(raw, "dsn").unwrap_or(":");
                let (prefix, rest) = dsn.split_once(':').unwrap_or((dsn, ""));
                driver = Some(Driver::from_dsn_prefix(prefix)?);
                for pair in rest.split(';') {
                    if let Some((key, value)) = pair.split_once('=') {
                        params.insert(key.trim().to_string(), value.trim().to_string());
                    }
                }
            }
            None => {}
        }

        if let Some(charset) = &conn.charset {
            params.insert("charset".to_string(), charset.clone());
        }
        params.retain(|_, v| !v.is_empty());

        for (key, value) in raw {
            if key == "driver" {
                driver = Some(value_to_string(value).parse()?);
            } else {
                params.insert(key.clone(), value_to_string(value));
            }
        }

        let driver = driver.ok_or_else(|| {
            config_error(format!(
                "Connection '{}' needs a 'type' or a 'driver' entry",
                name
            ))
        })?;

        Ok(ConnectionSettings {
            name: name.to_string(),
            driver: DriverOptions {
                driver,
                params
            },
            orm,
            profiling: conn.profiling
        })
    }
}
