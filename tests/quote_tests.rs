// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::borrow::Cow;

use sql_query_renderer::{
    query::{Literal, ParamType, ParameterSet, QueryRenderer, SqlDialect},
    quote::{DialectQuoter, ValueQuoter}
};

fn text(s: &str) -> Literal<'_> {
    Literal::Text(Cow::Borrowed(s))
}

#[test]
fn test_bool_per_dialect() {
    let mysql = DialectQuoter::new(SqlDialect::MySQL);
    let sqlite = DialectQuoter::new(SqlDialect::SQLite);
    let pg = DialectQuoter::new(SqlDialect::PostgreSQL);
    assert_eq!(mysql.quote(&Literal::Bool(true), None), "1");
    assert_eq!(sqlite.quote(&Literal::Bool(false), None), "0");
    assert_eq!(pg.quote(&Literal::Bool(false), None), "FALSE");
}

#[test]
fn test_int_with_boolean_hint() {
    let pg = DialectQuoter::new(SqlDialect::PostgreSQL);
    assert_eq!(pg.quote(&Literal::Int(1), Some(ParamType::Boolean)), "TRUE");
}

#[test]
fn test_string_hint_quotes_numbers() {
    let quoter = DialectQuoter::default();
    assert_eq!(quoter.quote(&Literal::Int(7), Some(ParamType::String)), "'7'");
    assert_eq!(quoter.quote(&Literal::Float(1.5), Some(ParamType::String)), "'1.5'");
}

#[test]
fn test_float_literals() {
    let quoter = DialectQuoter::default();
    assert_eq!(quoter.quote(&Literal::Float(2.25), None), "2.25");
    assert_eq!(quoter.quote(&Literal::Float(f64::NAN), None), "'NaN'");
}

#[test]
fn test_float_hint_leaves_numeric_text_bare() {
    let quoter = DialectQuoter::default();
    assert_eq!(quoter.quote(&text(" 3.5 "), Some(ParamType::Float)), "3.5");
    assert_eq!(quoter.quote(&text("abc"), Some(ParamType::Float)), "'abc'");
}

#[test]
fn test_mysql_control_characters() {
    let quoter = DialectQuoter::new(SqlDialect::MySQL);
    assert_eq!(quoter.quote_text("a\nb\0"), r"'a\nb\0'");
}

#[test]
fn test_clickhouse_uses_backslash_escapes() {
    let quoter = DialectQuoter::new(SqlDialect::ClickHouse);
    assert_eq!(quoter.quote_text("it's"), r"'it\'s'");
}

#[test]
fn test_sqlite_keeps_backslash() {
    let quoter = DialectQuoter::new(SqlDialect::SQLite);
    assert_eq!(quoter.quote_text(r"C:\tmp"), r"'C:\tmp'");
}

#[test]
fn test_blob_quoted_as_text() {
    let quoter = DialectQuoter::default();
    assert_eq!(
        quoter.quote(&Literal::Blob(String::from("{\"a\":1}")), None),
        "'{\"a\":1}'"
    );
}

/// Quoter wrapping every literal in angle brackets, standing in for a
/// driver's own quoting
struct BracketQuoter;

impl ValueQuoter for BracketQuoter {
    fn quote(&self, literal: &Literal<'_>, _hint: Option<ParamType>) -> String {
        match literal {
            Literal::Null => "<null>".to_string(),
            Literal::Int(i) => format!("<{}>", i),
            Literal::Text(s) => format!("<{}>", s),
            other => format!("<{:?}>", other)
        }
    }
}

#[test]
fn test_renderer_delegates_to_custom_quoter() {
    let quoter = BracketQuoter;
    let params = ParameterSet::positional([1_i64]);
    let out = QueryRenderer::new(&quoter)
        .render("SELECT ?", &params, None)
        .unwrap();
    assert_eq!(out.as_deref(), Some("SELECT <1>"));
}

#[test]
fn test_renderer_accepts_trait_object() {
    let quoter: Box<dyn ValueQuoter> = Box::new(DialectQuoter::new(SqlDialect::MySQL));
    let params = ParameterSet::named([("ok", true)]);
    let out = QueryRenderer::new(quoter.as_ref())
        .render("SELECT :ok", &params, None)
        .unwrap();
    assert_eq!(out.as_deref(), Some("SELECT 1"));
}

#[test]
fn test_unsigned_literal_bare_unless_hinted() {
    let quoter = DialectQuoter::new(SqlDialect::MySQL);
    assert_eq!(quoter.quote(&Literal::UInt(u64::MAX), None), "18446744073709551615");
    assert_eq!(quoter.quote(&Literal::UInt(7), Some(ParamType::String)), "'7'");
    assert_eq!(quoter.quote(&Literal::UInt(2), Some(ParamType::Boolean)), "1");
}
