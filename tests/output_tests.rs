// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_query_renderer::{
    config::Config,
    output::{
        BatchItem, BatchReport, OutputFormat, OutputOptions, RenderReport, format_batch_report,
        format_connection, format_render_report
    },
    query::{QueryType, SqlDialect}
};

fn plain() -> OutputOptions {
    OutputOptions {
        format:  OutputFormat::Text,
        colored: false
    }
}

fn with_format(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false
    }
}

fn report(rendered: Option<&str>) -> RenderReport {
    RenderReport {
        label:      rendered.map(|_| "Database (default)".to_string()),
        dialect:    SqlDialect::Generic,
        original:   "SELECT ?".to_string(),
        rendered:   rendered.map(str::to_string),
        statements: Vec::new()
    }
}

fn batch() -> BatchReport {
    BatchReport::from_items(vec![
        BatchItem {
            line:     1,
            rendered: Some("SELECT 1".to_string()),
            skipped:  false,
            error:    None
        },
        BatchItem {
            line:     2,
            rendered: None,
            skipped:  true,
            error:    None
        },
        BatchItem {
            line:     3,
            rendered: None,
            skipped:  false,
            error:    Some("no value bound".to_string())
        }
    ])
}

#[test]
fn test_output_format_default() {
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
    assert!(OutputOptions::default().colored);
}

#[test]
fn test_text_render_prints_sql_only() {
    assert_eq!(format_render_report(&report(Some("SELECT 1")), &plain()), "SELECT 1");
}

#[test]
fn test_text_render_explain_note() {
    let out = format_render_report(&report(None), &plain());
    assert!(out.contains("EXPLAIN"));
}

#[test]
fn test_text_render_lists_verified_statements() {
    let mut r = report(Some("SELECT 1"));
    r.statements = vec![QueryType::Select];
    let out = format_render_report(&r, &plain());
    assert!(out.ends_with("-- verified: SELECT"));
}

#[test]
fn test_json_render() {
    let out = format_render_report(&report(Some("SELECT 1")), &with_format(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["rendered"], "SELECT 1");
    assert_eq!(value["dialect"], "generic");
    assert!(value.get("statements").is_none());
}

#[test]
fn test_yaml_render() {
    let out = format_render_report(&report(Some("SELECT 1")), &with_format(OutputFormat::Yaml));
    assert!(out.contains("rendered: SELECT 1"));
}

#[test]
fn test_batch_counts() {
    let report = batch();
    assert_eq!(report.rendered, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
}

#[test]
fn test_text_batch() {
    let out = format_batch_report(&batch(), &plain());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "SELECT 1");
    assert!(lines[1].starts_with("-- line 2:"));
    assert_eq!(lines[2], "-- line 3: no value bound");
    assert_eq!(lines[3], "-- 1 rendered, 1 skipped, 1 failed");
}

#[test]
fn test_json_batch() {
    let out = format_batch_report(&batch(), &with_format(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["failed"], 1);
    assert_eq!(value["items"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_connection_masks_password() {
    let config = Config::from_toml_str(
        r#"
[orm]
metadata_path = "src/Entity"
proxy_dir = "var/proxies"
proxy_namespace = "Proxies"

[connections.default]
type = "mysql"
profiling = true
connection = { hostname = "db", password = "s3cret" }
"#
    )
    .unwrap();
    let settings = config.resolve_connection(None).unwrap();

    let text = format_connection(&settings, &plain());
    assert!(text.contains("Connection 'default'"));
    assert!(text.contains("pdo_mysql"));
    assert!(text.contains("password = ***"));
    assert!(text.contains("Profiling: on"));
    assert!(!text.contains("s3cret"));

    let json = format_connection(&settings, &with_format(OutputFormat::Json));
    assert!(!json.contains("s3cret"));
}
