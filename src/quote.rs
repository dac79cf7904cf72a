//! Literal quoting.
//!
//! The renderer never escapes values itself; it hands each coerced
//! [`Literal`] to a [`ValueQuoter`]. [`DialectQuoter`] covers the dialects
//! the CLI knows about. Applications embedding the renderer next to a live
//! connection can implement the trait on top of the driver's own quoting.

use crate::query::{Literal, ParamType, SqlDialect, StringEscapes};

/// Turns a literal into SQL text
pub trait ValueQuoter {
    fn quote(&self, literal: &Literal<'_>, hint: Option<ParamType>) -> String;

    /// Escape rules of string literals already present in the statement
    fn string_escapes(&self) -> StringEscapes {
        StringEscapes::Standard
    }
}

impl<Q: ValueQuoter + ?Sized> ValueQuoter for &Q {
    fn quote(&self, literal: &Literal<'_>, hint: Option<ParamType>) -> String {
        (**self).quote(literal, hint)
    }

    fn string_escapes(&self) -> StringEscapes {
        (**self).string_escapes()
    }
}

/// Quoter following the escaping rules of a SQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectQuoter {
    dialect: SqlDialect
}

impl DialectQuoter {
    #[must_use]
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn quote_bool(&self, value: bool) -> String {
        let text = match (self.dialect, value) {
            (SqlDialect::MySQL | SqlDialect::SQLite, true) => "1",
            (SqlDialect::MySQL | SqlDialect::SQLite, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE"
        };
        text.to_string()
    }

    /// Quote text as a string literal
    pub fn quote_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        match self.dialect.string_escapes() {
            StringEscapes::Backslash => {
                for c in text.chars() {
                    match c {
                        '\'' => out.push_str("\\'"),
                        '\\' => out.push_str("\\\\"),
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\x1a' => out.push_str("\\Z"),
                        _ => out.push(c)
                    }
                }
            }
            StringEscapes::Standard => {
                for c in text.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
            }
        }
        out.push('\'');
        out
    }

    fn quote_float(&self, value: f64) -> String {
        if !value.is_finite() {
            return self.quote_text(&value.to_string());
        }
        value.to_string()
    }
}

impl ValueQuoter for DialectQuoter {
    fn quote(&self, literal: &Literal<'_>, hint: Option<ParamType>) -> String {
        let hint = hint.map(|t| t.element_type().unwrap_or(t));
        match (literal, hint) {
            (Literal::Null, _) => "NULL".to_string(),
            (Literal::Bool(b), _) => self.quote_bool(*b),
            (Literal::Int(i), Some(ParamType::Boolean)) => self.quote_bool(*i != 0),
            (Literal::Int(i), Some(ParamType::String)) => self.quote_text(&i.to_string()),
            (Literal::Int(i), _) => i.to_string(),
            (Literal::UInt(u), Some(ParamType::Boolean)) => self.quote_bool(*u != 0),
            (Literal::UInt(u), Some(ParamType::String)) => self.quote_text(&u.to_string()),
            (Literal::UInt(u), _) => u.to_string(),
            (Literal::Float(f), Some(ParamType::String)) => self.quote_text(&f.to_string()),
            (Literal::Float(f), _) => self.quote_float(*f),
            (Literal::Text(s), Some(ParamType::Integer)) if s.trim().parse::<i64>().is_ok() => {
                s.trim().to_string()
            }
            (Literal::Text(s), Some(ParamType::Float)) if s.trim().parse::<f64>().is_ok() => {
                s.trim().to_string()
            }
            (Literal::Text(s), _) => self.quote_text(s),
            (Literal::Blob(s), _) => self.quote_text(s)
        }
    }

    fn string_escapes(&self) -> StringEscapes {
        self.dialect.string_escapes()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn test_postgres_doubles_quotes() {
        let quoter = DialectQuoter::new(SqlDialect::PostgreSQL);
        assert_eq!(quoter.quote_text("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_mysql_escapes_backslash_and_quote() {
        let quoter = DialectQuoter::new(SqlDialect::MySQL);
        assert_eq!(quoter.quote_text(r"a\b'c"), r"'a\\b\'c'");
    }

    #[test]
    fn test_integer_hint_leaves_numeric_text_bare() {
        let quoter = DialectQuoter::default();
        let literal = Literal::Text(Cow::Borrowed("42"));
        assert_eq!(quoter.quote(&literal, Some(ParamType::IntegerArray)), "42");
        assert_eq!(quoter.quote(&literal, None), "'42'");
    }
}
