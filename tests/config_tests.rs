use std::path::PathBuf;

use sql_query_renderer::{
    config::{CacheDriver, Config, Driver, MetadataDriver},
    logger::LogOutcome,
    profiler::Profiler,
    query::{ParameterSet, SqlDialect},
    quote::DialectQuoter
};

const BASE: &str = r#"
[orm]
metadata_path = "src/Entity"
proxy_dir = "var/proxies"
proxy_namespace = "Proxies"
"#;

fn config(extra: &str) -> Config {
    Config::from_toml_str(&format!("{}\n{}", BASE, extra)).unwrap()
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.active, "default");
    assert!(config.orm.is_none());
    assert!(config.connections.is_empty());
    assert!(config.render.dialect.is_none());
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_empty_file_is_default() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.active, "default");
}

#[test]
fn test_mysql_connection_translation() {
    let config = config(
        r#"
[connections.default]
type = "mysqli"
charset = "utf8mb4"

[connections.default.connection]
hostname = "db.local"
database = "app"
username = "svc"
"#
    );

    let settings = config.resolve_connection(None).unwrap();
    assert_eq!(settings.driver.driver, Driver::PdoMysql);
    assert_eq!(settings.dialect(), SqlDialect::MySQL);

    let params = &settings.driver.params;
    assert_eq!(params.get("host").map(String::as_str), Some("db.local"));
    assert_eq!(params.get("dbname").map(String::as_str), Some("app"));
    assert_eq!(params.get("user").map(String::as_str), Some("svc"));
    assert_eq!(params.get("charset").map(String::as_str), Some("utf8mb4"));
}

#[test]
fn test_pdo_dsn_translation() {
    let config = config(
        r#"
[connections.reports]
type = "pdo"
connection = { dsn = "pgsql:host=replica; dbname=reports", username = "ro" }
"#
    );

    let settings = config.connection_settings("reports").unwrap();
    assert_eq!(settings.driver.driver, Driver::PdoPgsql);
    assert_eq!(settings.dialect(), SqlDialect::PostgreSQL);
    assert_eq!(
        settings.driver.params.get("host").map(String::as_str),
        Some("replica")
    );
    assert_eq!(
        settings.driver.params.get("dbname").map(String::as_str),
        Some("reports")
    );
    assert_eq!(
        settings.driver.params.get("user").map(String::as_str),
        Some("ro")
    );
}

#[test]
fn test_unknown_dsn_prefix_rejected() {
    let config = config(
        r#"
[connections.default]
type = "pdo"
connection = { dsn = "firebird:host=x" }
"#
    );

    assert!(config.resolve_connection(None).is_err());
}

#[test]
fn test_raw_driver_without_type() {
    let config = config(
        r#"
[connections.local]
connection = { driver = "pdo_sqlite", path = "app.db" }
"#
    );

    let settings = config.connection_settings("local").unwrap();
    assert_eq!(settings.driver.driver, Driver::PdoSqlite);
    assert_eq!(
        settings.driver.params.get("path").map(String::as_str),
        Some("app.db")
    );
    assert!(!settings.driver.params.contains_key("driver"));
}

#[test]
fn test_missing_driver_rejected() {
    let config = config(
        r#"
[connections.default]
connection = { host = "x" }
"#
    );

    assert!(config.resolve_connection(None).is_err());
}

#[test]
fn test_raw_table_overrides_translation() {
    let config = config(
        r#"
[connections.default]
type = "mysql"
connection = { hostname = "a", host = "b" }
"#
    );

    let settings = config.resolve_connection(None).unwrap();
    assert_eq!(
        settings.driver.params.get("host").map(String::as_str),
        Some("b")
    );
}

#[test]
fn test_orm_defaults_and_override() {
    let config = config(
        r#"
[connections.default]
type = "mysql"
connection = { hostname = "h" }
orm = { proxy_dir = "var/other", cache_driver = "apc" }
"#
    );

    let orm = config.resolve_connection(None).unwrap().orm;
    assert_eq!(orm.proxy_dir, PathBuf::from("var/other"));
    assert_eq!(orm.metadata_path, PathBuf::from("src/Entity"));
    assert_eq!(orm.cache_driver, CacheDriver::Apc);
    assert_eq!(orm.metadata_driver, MetadataDriver::Annotation);
    assert!(!orm.auto_generate_proxy_classes);
}

#[test]
fn test_missing_orm_key_rejected() {
    let config = Config::from_toml_str(
        r#"
[orm]
metadata_path = "src"

[connections.default]
type = "mysql"
connection = { hostname = "h" }
"#
    )
    .unwrap();

    assert!(config.resolve_connection(None).is_err());
}

#[test]
fn test_unknown_connection_rejected() {
    let config = config("");
    assert!(config.connection_settings("nope").is_err());
}

#[test]
fn test_unknown_cache_driver_rejected_at_load() {
    let result = Config::from_toml_str(
        r#"
[orm]
cache_driver = "memcached"
"#
    );
    assert!(result.is_err());
}

#[test]
fn test_unknown_metadata_driver_rejected_at_load() {
    let result = Config::from_toml_str(
        r#"
[orm]
metadata_driver = "json"
"#
    );
    assert!(result.is_err());
}

#[test]
fn test_cache_driver_none() {
    let config = Config::from_toml_str(
        r#"
[orm]
cache_driver = "none"
"#
    )
    .unwrap();
    let cache = config.orm.and_then(|o| o.cache_driver);
    assert_eq!(cache, Some(CacheDriver::None));
    assert!(!CacheDriver::None.is_enabled());
}

#[test]
fn test_metadata_driver_extensions() {
    assert_eq!(MetadataDriver::SimplifiedYaml.file_extension(), ".orm.yml");
    assert_eq!(MetadataDriver::Xml.file_extension(), ".dcm.xml");
}

#[test]
fn test_render_dialect_section() {
    let config = Config::from_toml_str("[render]\ndialect = \"sqlite\"").unwrap();
    assert_eq!(config.render.dialect, Some(SqlDialect::SQLite));
}

#[test]
fn test_driver_dialects() {
    assert_eq!(Driver::PdoMysql.dialect(), SqlDialect::MySQL);
    assert_eq!(Driver::PdoSqlsrv.dialect(), SqlDialect::Generic);
    assert_eq!(Driver::PdoOci.to_string(), "pdo_oci");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "active = \"reports\"\n[logging]\nlevel = \"debug\"\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_query_logger_follows_profiling_flag() {
    let config = config(
        r#"
[connections.traced]
connection = { driver = "pdo_sqlite" }
profiling = true

[connections.quiet]
connection = { driver = "pdo_sqlite" }
"#
    );

    let traced = config.connection_settings("traced").unwrap();
    let mut logger = traced
        .query_logger(DialectQuoter::new(traced.dialect()), Profiler::new())
        .unwrap();
    assert_eq!(logger.label(), "Database (traced)");
    let params = ParameterSet::positional([true]);
    assert_eq!(
        logger.start_query("SELECT ?", Some(&params), None),
        LogOutcome::Started
    );
    logger.stop_query();
    assert_eq!(logger.sink().entries()[0].sql, "SELECT 1");

    let quiet = config.connection_settings("quiet").unwrap();
    assert!(!quiet.profiling);
    assert!(
        quiet
            .query_logger(DialectQuoter::new(quiet.dialect()), Profiler::new())
            .is_none()
    );
}
