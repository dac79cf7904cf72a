//! # SQL Query Renderer
//!
//! Substitutes bound parameters into parameterized SQL so statements can be
//! logged and profiled as they would execute.
//!
//! A statement such as `SELECT * FROM t WHERE id = ? AND name = ?` with
//! values `[5, "bob"]` renders as `SELECT * FROM t WHERE id = 5 AND name =
//! 'bob'`. The rendered text is a diagnostic artifact; the database still
//! receives the statement and its values separately.
//!
//! # Pipeline
//!
//! 1. **Expansion** - list-valued parameters become one placeholder per
//!    element, so `IN (?)` with `[1, 2, 3]` becomes `IN (?, ?, ?)`.
//! 2. **Location** - placeholders outside quoted literals are found in one
//!    left-to-right scan.
//! 3. **Coercion** - each value is normalized against its declared type.
//! 4. **Quoting** - a [`quote::ValueQuoter`] turns the value into a literal
//!    for the target dialect.
//! 5. **Assembly** - literals are spliced in a single pass, so quoted text
//!    containing `?` or `:name` is never rescanned.
//!
//! `EXPLAIN` statements are never rendered or profiled.
//!
//! # Quick Start
//!
//! ```bash
//! sql-query-renderer render "SELECT * FROM t WHERE id IN (?)" -p '[[1, 2, 3]]'
//!
//! # Named placeholders, MySQL quoting
//! sql-query-renderer render "SELECT :a, :b" -p '{"b": "x", "a": 1}' --dialect mysql
//!
//! # JSON-lines batch
//! sql-query-renderer batch queries.jsonl --progress
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQL_RENDERER_CONNECTION`, `SQL_RENDERER_DIALECT`,
//!    `SQL_RENDERER_LOG`)
//! 3. `.sql-renderer.toml` in current directory
//! 4. `~/.config/sql-renderer/config.toml`
//!
//! # Modules
//!
//! - [`query`] - Placeholder location, list expansion, coercion and assembly
//! - [`quote`] - Dialect-aware literal quoting
//! - [`logger`] - Query logger hooking rendering into a timing sink
//! - [`profiler`] - Timing sinks
//! - [`config`] - Configuration loading and connection resolution
//! - [`output`] - Result formatting
//! - [`error`] - Error types and constructors

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod logging;
pub mod output;
pub mod profiler;
pub mod query;
pub mod quote;
