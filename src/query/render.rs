use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::{
    coerce::coerce,
    expand::expand_list_parameters,
    locate::locate_placeholders,
    types::{ParameterSet, TypeHints}
};
use crate::{error::RenderError, quote::ValueQuoter};

static EXPLAIN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*EXPLAIN\b").expect("valid regex"));

/// Whether the statement is an `EXPLAIN` wrapper, which is never rendered
pub fn is_explain(sql: &str) -> bool {
    EXPLAIN_PREFIX.is_match(sql)
}

/// Substitutes bound values into parameterized SQL for display.
///
/// Holds nothing but a borrowed quoter, so one renderer may be shared
/// across threads when the quoter is `Sync`.
#[derive(Debug)]
pub struct QueryRenderer<'q, Q: ?Sized> {
    quoter: &'q Q
}

impl<'q, Q: ValueQuoter + ?Sized> QueryRenderer<'q, Q> {
    pub fn new(quoter: &'q Q) -> Self {
        Self {
            quoter
        }
    }

    /// Render `sql` with every placeholder replaced by a quoted literal.
    ///
    /// Returns `Ok(None)` for `EXPLAIN` statements. Fails without output when
    /// a placeholder has no value; values nothing refers to are ignored.
    pub fn render(
        &self,
        sql: &str,
        params: &ParameterSet,
        types: Option<&TypeHints>
    ) -> Result<Option<String>, RenderError> {
        if is_explain(sql) {
            trace!("not rendering EXPLAIN statement");
            return Ok(None);
        }

        let no_types = TypeHints::default();
        let escapes = self.quoter.string_escapes();
        let expanded = expand_list_parameters(sql, params, types.unwrap_or(&no_types), escapes)?;
        let sql = expanded.sql.as_ref();
        let occurrences = locate_placeholders(sql, expanded.params.style(), escapes)?;
        if occurrences.is_empty() {
            return Ok(Some(sql.to_string()));
        }

        let mut out = String::with_capacity(sql.len() + occurrences.len() * 8);
        let mut cursor = 0;
        for occurrence in &occurrences {
            let value = expanded.params.get(&occurrence.token).ok_or_else(|| {
                RenderError::UnresolvedPlaceholder {
                    token:  occurrence.token.to_string().into(),
                    offset: occurrence.offset
                }
            })?;
            let hint = expanded.types.get(&occurrence.token);
            out.push_str(&sql[cursor..occurrence.offset]);
            out.push_str(&self.quoter.quote(&coerce(value, hint), hint));
            cursor = occurrence.end();
        }
        out.push_str(&sql[cursor..]);

        Ok(Some(out))
    }
}
