//! Application logic for the SQL Query Renderer CLI.
//!
//! This module contains the command implementations separated from the
//! main entry point to enable testing.

use std::{
    fs::read_to_string,
    io::{self, Read}
};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    cli::{Dialect, Format},
    config::{Config, ConnectionSettings},
    error::{AppResult, file_read_error, params_parse_error},
    logger::{LogOutcome, QueryLogger},
    output::{BatchItem, BatchReport, OutputFormat, OutputOptions, RenderReport},
    profiler::Profiler,
    query::{ParameterSet, QueryRenderer, SqlDialect, TypeHints, verify_rendered},
    quote::DialectQuoter
};

/// Parameters for the render command
#[derive(Debug, Clone)]
pub struct RenderParams {
    pub sql:        String,
    pub params:     Option<String>,
    pub types:      Option<String>,
    pub dialect:    Option<Dialect>,
    pub connection: Option<String>,
    pub verify:     bool
}

/// Parameters for the batch command
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub input:      String,
    pub dialect:    Option<Dialect>,
    pub connection: Option<String>,
    pub progress:   bool
}

/// One line of batch input
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEntry {
    pub sql:    String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub types:  Option<Value>
}

/// Convert CLI dialect to internal SqlDialect
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite,
        Dialect::Clickhouse => SqlDialect::ClickHouse
    }
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool) -> OutputOptions {
    OutputOptions {
        format:  convert_format(format),
        colored: !no_color
    }
}

/// Read input from file or stdin
pub fn read_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Parse `--params` JSON; no parameters is an empty positional set
pub fn parse_params(json: Option<&str>) -> AppResult<ParameterSet> {
    match json {
        None => Ok(ParameterSet::default()),
        Some(text) => {
            let value: Value =
                serde_json::from_str(text).map_err(|e| params_parse_error(e.to_string()))?;
            ParameterSet::from_json(value)
        }
    }
}

/// Parse `--types` JSON
pub fn parse_types(json: Option<&str>) -> AppResult<Option<TypeHints>> {
    json.map(|text| {
        let value: Value =
            serde_json::from_str(text).map_err(|e| params_parse_error(e.to_string()))?;
        TypeHints::from_json(value)
    })
    .transpose()
}

/// Pick the quoting dialect and the connection name used as log label.
///
/// An explicit dialect wins. Otherwise the named connection, or the active
/// one when it is configured, decides through its driver; failing that the
/// configured default applies.
pub fn resolve_dialect(
    dialect: Option<Dialect>,
    connection: Option<&str>,
    config: &Config
) -> AppResult<(SqlDialect, String)> {
    let name = connection.unwrap_or(&config.active).to_string();
    if let Some(dialect) = dialect {
        return Ok((convert_dialect(dialect), name));
    }
    if connection.is_some() {
        let settings = config.connection_settings(&name)?;
        debug!(connection = %name, driver = %settings.driver.driver, "dialect from connection");
        return Ok((settings.dialect(), name));
    }
    if config.connections.contains_key(&name) {
        match config.connection_settings(&name) {
            Ok(settings) => return Ok((settings.dialect(), name)),
            Err(e) => debug!(connection = %name, error = %e, "active connection unusable")
        }
    }
    Ok((config.render.dialect.unwrap_or_default(), name))
}

/// Run the render command
pub fn run_render(params: RenderParams, config: &Config) -> AppResult<RenderReport> {
    let sql = if params.sql == "-" {
        read_input("-")?
    } else {
        params.sql
    };
    let bound = parse_params(params.params.as_deref())?;
    let types = parse_types(params.types.as_deref())?;
    let (dialect, connection) =
        resolve_dialect(params.dialect, params.connection.as_deref(), config)?;
    let settings = params
        .connection
        .as_deref()
        .map(|name| config.connection_settings(name))
        .transpose()?;

    let quoter = DialectQuoter::new(dialect);
    let logger = match &settings {
        Some(settings) => settings.query_logger(quoter, Profiler::new()),
        None => Some(QueryLogger::new(&connection, quoter, Profiler::new()))
    };

    let (rendered, label) = match logger {
        Some(mut logger) => {
            let outcome = logger.start_query(&sql, Some(&bound), types.as_ref());
            logger.stop_query();
            let label = logger.label().to_string();
            let rendered = match outcome {
                LogOutcome::Started => logger
                    .into_sink()
                    .into_entries()
                    .pop()
                    .map(|entry| entry.sql),
                LogOutcome::SkippedExplain => None,
                LogOutcome::Failed(err) => return Err(err.into())
            };
            let label = rendered.as_ref().map(|_| label);
            (rendered, label)
        }
        None => {
            debug!(connection = %connection, "profiling off, rendering without logger");
            let rendered = QueryRenderer::new(&quoter).render(&sql, &bound, types.as_ref())?;
            (rendered, None)
        }
    };

    let statements = match (&rendered, params.verify) {
        (Some(text), true) => verify_rendered(text, dialect)?,
        _ => Vec::new()
    };

    Ok(RenderReport {
        label,
        dialect,
        original: sql,
        rendered,
        statements
    })
}

fn render_entry(
    renderer: &QueryRenderer<'_, DialectQuoter>,
    line: usize,
    text: &str
) -> BatchItem {
    let result = serde_json::from_str::<BatchEntry>(text)
        .map_err(|e| format!("invalid batch entry: {}", e))
        .and_then(|entry| {
            let params = match entry.params {
                Some(value) => ParameterSet::from_json(value).map_err(|e| e.to_string())?,
                None => ParameterSet::default()
            };
            let types = entry
                .types
                .map(TypeHints::from_json)
                .transpose()
                .map_err(|e| e.to_string())?;
            renderer
                .render(&entry.sql, &params, types.as_ref())
                .map_err(|e| e.to_string())
        });
    match result {
        Ok(rendered) => BatchItem {
            line,
            skipped: rendered.is_none(),
            rendered,
            error: None
        },
        Err(err) => BatchItem {
            line,
            rendered: None,
            skipped: false,
            error: Some(err)
        }
    }
}

/// Run the batch command; lines are rendered in parallel
pub fn run_batch(params: BatchParams, config: &Config) -> AppResult<BatchReport> {
    let input = read_input(&params.input)?;
    let (dialect, _) = resolve_dialect(params.dialect, params.connection.as_deref(), config)?;
    let quoter = DialectQuoter::new(dialect);
    let renderer = QueryRenderer::new(&quoter);

    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
        .collect();

    let pb = if params.progress {
        let pb = ProgressBar::new(lines.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.green} {pos}/{len} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("rendering");
        pb
    } else {
        ProgressBar::hidden()
    };

    let items: Vec<BatchItem> = lines
        .par_iter()
        .map(|(line, text)| {
            let item = render_entry(&renderer, *line, text);
            pb.inc(1);
            item
        })
        .collect();
    pb.finish_and_clear();

    let report = BatchReport::from_items(items);
    info!(
        rendered = report.rendered,
        skipped = report.skipped,
        failed = report.failed,
        "batch finished"
    );
    Ok(report)
}

/// Exit code for a batch: 1 when any line failed
pub fn calculate_exit_code(report: &BatchReport) -> i32 {
    if report.failed > 0 { 1 } else { 0 }
}

/// Run the connection command
pub fn run_connection(name: Option<&str>, config: &Config) -> AppResult<ConnectionSettings> {
    config.resolve_connection(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_dialect_all() {
        assert_eq!(convert_dialect(Dialect::Mysql), SqlDialect::MySQL);
        assert_eq!(convert_dialect(Dialect::Postgresql), SqlDialect::PostgreSQL);
        assert_eq!(convert_dialect(Dialect::Clickhouse), SqlDialect::ClickHouse);
    }

    #[test]
    fn test_render_entry_reports_error_per_line() {
        let quoter = DialectQuoter::default();
        let renderer = QueryRenderer::new(&quoter);
        let item = render_entry(&renderer, 3, r#"{"sql": "SELECT ?", "params": []}"#);
        assert_eq!(item.line, 3);
        assert!(item.rendered.is_none());
        assert!(item.error.is_some());
    }

    #[test]
    fn test_render_entry_without_params() {
        let quoter = DialectQuoter::default();
        let renderer = QueryRenderer::new(&quoter);
        let item = render_entry(&renderer, 1, r#"{"sql": "SELECT 1"}"#);
        assert_eq!(item.rendered.as_deref(), Some("SELECT 1"));
    }
}
