use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Query Renderer - Substitute bound parameters into SQL for logging and profiling
#[derive(Parser, Debug)]
#[command(name = "sql-query-renderer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to .sql-renderer.toml, then ~/.config)
    #[arg(long, global = true, env = "SQL_RENDERER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one parameterized statement
    Render {
        /// SQL text (use - for stdin)
        sql: String,

        /// Bound values as JSON: an array for `?`, an object for `:name`
        #[arg(short, long)]
        params: Option<String>,

        /// Declared types as JSON, shaped like the parameters
        #[arg(short, long)]
        types: Option<String>,

        /// Quoting dialect (defaults to the connection's driver)
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Connection whose driver selects the dialect
        #[arg(short, long)]
        connection: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Parse the rendered SQL to check it is well-formed
        #[arg(long)]
        verify: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },
    /// Render a JSON-lines file of statements in parallel
    Batch {
        /// File with one `{"sql": ..., "params": ..., "types": ...}` per line (use - for stdin)
        input: PathBuf,

        /// Quoting dialect (defaults to the connection's driver)
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Connection whose driver selects the dialect
        #[arg(short, long)]
        connection: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Show a progress bar on stderr
        #[arg(long)]
        progress: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },
    /// Show resolved settings of a configured connection
    Connection {
        /// Connection name (defaults to the active connection)
        name: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite,
    Clickhouse
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
