//! Parameterized statement rendering.
//!
//! The pipeline for one statement is:
//!
//! 1. [`expand_list_parameters`] unrolls list-valued parameters
//! 2. [`locate_placeholders`] finds `?` or `:name` tokens
//! 3. [`coerce`] maps each bound value to a [`Literal`]
//! 4. [`QueryRenderer`] splices the quoted literals into the SQL
//!
//! # Example
//!
//! ```
//! use sql_query_renderer::{
//!     query::{ParameterSet, QueryRenderer, SqlDialect},
//!     quote::DialectQuoter
//! };
//!
//! let quoter = DialectQuoter::new(SqlDialect::PostgreSQL);
//! let params = ParameterSet::named([("name", "Alice")]);
//! let sql = QueryRenderer::new(&quoter)
//!     .render("SELECT * FROM t WHERE name = :name", &params, None)
//!     .unwrap();
//!
//! assert_eq!(sql.as_deref(), Some("SELECT * FROM t WHERE name = 'Alice'"));
//! ```

mod coerce;
mod expand;
mod locate;
mod render;
mod types;

pub use coerce::{Literal, coerce};
pub use expand::{Expanded, expand_list_parameters};
pub use locate::{Occurrences, locate_placeholders};
pub use render::{QueryRenderer, is_explain};
use serde::{Deserialize, Serialize};
use sqlparser::{
    ast::Statement,
    dialect::{
        ClickHouseDialect, Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect
    },
    parser::Parser
};
pub use types::{
    DATETIME_FORMAT, ParamType, ParamValue, ParameterSet, PlaceholderOccurrence,
    PlaceholderStyle, PlaceholderToken, StringEscapes, TypeHints
};

use crate::error::{AppError, AppResult, config_error, verify_error};

/// SQL dialect used for quoting and verification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    Generic,
    #[serde(alias = "mysqli")]
    MySQL,
    #[serde(alias = "pgsql", alias = "postgres")]
    PostgreSQL,
    SQLite,
    ClickHouse
}

impl SqlDialect {
    /// Escape rules of the dialect's string literals
    pub fn string_escapes(self) -> StringEscapes {
        match self {
            Self::MySQL | Self::ClickHouse => StringEscapes::Backslash,
            _ => StringEscapes::Standard
        }
    }

    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {}),
            Self::ClickHouse => Box::new(ClickHouseDialect {})
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::MySQL => write!(f, "mysql"),
            Self::PostgreSQL => write!(f, "postgresql"),
            Self::SQLite => write!(f, "sqlite"),
            Self::ClickHouse => write!(f, "clickhouse")
        }
    }
}

impl std::str::FromStr for SqlDialect {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "mysql" | "mysqli" => Ok(Self::MySQL),
            "postgresql" | "postgres" | "pgsql" => Ok(Self::PostgreSQL),
            "sqlite" => Ok(Self::SQLite),
            "clickhouse" => Ok(Self::ClickHouse),
            other => Err(config_error(format!("Unsupported SQL dialect '{}'", other)))
        }
    }
}

/// Type of SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Other => write!(f, "OTHER")
        }
    }
}

impl From<&Statement> for QueryType {
    fn from(stmt: &Statement) -> Self {
        match stmt {
            Statement::Query(_) => Self::Select,
            Statement::Insert(_) => Self::Insert,
            Statement::Update { .. } => Self::Update,
            Statement::Delete(_) => Self::Delete,
            _ => Self::Other
        }
    }
}

/// Parse rendered SQL to confirm it is well-formed in `dialect`.
///
/// Returns the type of each statement found. Composite values rendered as
/// JSON text still parse, as they are plain string literals.
pub fn verify_rendered(sql: &str, dialect: SqlDialect) -> AppResult<Vec<QueryType>> {
    let parser_dialect = dialect.into_parser_dialect();
    let statements =
        Parser::parse_sql(parser_dialect.as_ref(), sql).map_err(|e| verify_error(e.to_string()))?;
    Ok(statements.iter().map(QueryType::from).collect())
}
