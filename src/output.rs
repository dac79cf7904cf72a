use colored::Colorize;
use serde::Serialize;

use crate::{
    config::ConnectionSettings,
    query::{QueryType, SqlDialect}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true
        }
    }
}

/// Result of rendering one statement
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// Profiler label, when the statement was logged
    pub label:      Option<String>,
    pub dialect:    SqlDialect,
    pub original:   String,
    /// `None` for skipped EXPLAIN statements
    pub rendered:   Option<String>,
    /// Statement types found by `--verify`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<QueryType>
}

/// One line of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// 1-based input line
    pub line:     usize,
    pub rendered: Option<String>,
    pub skipped:  bool,
    pub error:    Option<String>
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub items:    Vec<BatchItem>,
    pub rendered: usize,
    pub skipped:  usize,
    pub failed:   usize
}

impl BatchReport {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let failed = items.iter().filter(|i| i.error.is_some()).count();
        let skipped = items.iter().filter(|i| i.skipped).count();
        let rendered = items.len() - failed - skipped;
        Self {
            items,
            rendered,
            skipped,
            failed
        }
    }
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Json => Some(serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Yaml => Some(serde_yaml::to_string(value).unwrap_or_default()),
        OutputFormat::Text => None
    }
}

fn paint(text: &str, colored: bool, style: fn(&str) -> colored::ColoredString) -> String {
    if colored { style(text).to_string() } else { text.to_string() }
}

/// Format a single render result
pub fn format_render_report(report: &RenderReport, opts: &OutputOptions) -> String {
    if let Some(out) = serialize(report, opts.format) {
        return out;
    }

    let mut output = match &report.rendered {
        Some(sql) => sql.clone(),
        None => paint(
            "-- EXPLAIN statement, not rendered",
            opts.colored,
            |s| s.dimmed()
        )
    };
    if !report.statements.is_empty() {
        let kinds: Vec<String> = report.statements.iter().map(ToString::to_string).collect();
        output.push('\n');
        output.push_str(&paint(
            &format!("-- verified: {}", kinds.join(", ")),
            opts.colored,
            |s| s.green()
        ));
    }
    output
}

/// Format batch results
pub fn format_batch_report(report: &BatchReport, opts: &OutputOptions) -> String {
    if let Some(out) = serialize(report, opts.format) {
        return out;
    }

    let mut output = String::new();
    for item in &report.items {
        match (&item.rendered, &item.error) {
            (Some(sql), _) => output.push_str(sql),
            (None, Some(err)) => output.push_str(&paint(
                &format!("-- line {}: {}", item.line, err),
                opts.colored,
                |s| s.red()
            )),
            (None, None) => output.push_str(&paint(
                &format!("-- line {}: EXPLAIN statement, not rendered", item.line),
                opts.colored,
                |s| s.dimmed()
            ))
        }
        output.push('\n');
    }

    let summary = format!(
        "-- {} rendered, {} skipped, {} failed",
        report.rendered, report.skipped, report.failed
    );
    output.push_str(&paint(&summary, opts.colored, |s| s.bold()));
    output
}

/// Format resolved connection settings; passwords are masked
pub fn format_connection(settings: &ConnectionSettings, opts: &OutputOptions) -> String {
    let masked = ConnectionSettings {
        driver: settings.driver.redacted(),
        ..settings.clone()
    };
    if let Some(out) = serialize(&masked, opts.format) {
        return out;
    }

    let header = format!("Connection '{}'", masked.name);
    let mut output = paint(&header, opts.colored, |s| s.cyan().bold());
    output.push('\n');
    output.push_str(&format!(
        "Driver: {} (dialect: {})\n",
        masked.driver.driver,
        masked.dialect()
    ));
    for (key, value) in &masked.driver.params {
        output.push_str(&format!("  {} = {}\n", key, value));
    }

    let orm = &masked.orm;
    output.push_str(&format!(
        "Metadata: {} driver reading *{} from {}\n",
        orm.metadata_driver,
        orm.metadata_driver.file_extension(),
        orm.metadata_path.display()
    ));
    if orm.cache_driver.is_enabled() {
        output.push_str(&format!(
            "Cache: {} (metadata, query, result)\n",
            orm.cache_driver
        ));
    } else {
        output.push_str("Cache: disabled\n");
    }
    output.push_str(&format!(
        "Proxies: {} in {} (auto-generate: {})\n",
        orm.proxy_namespace,
        orm.proxy_dir.display(),
        if orm.auto_generate_proxy_classes { "yes" } else { "no" }
    ));
    output.push_str(&format!(
        "Profiling: {}",
        if masked.profiling { "on" } else { "off" }
    ));
    output
}
