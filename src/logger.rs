//! Query logging hook.
//!
//! [`QueryLogger`] sits between the code executing statements and a
//! [`TimingSink`]. For every statement it renders the SQL with its bound
//! values and opens a timing entry labelled with the connection name.
//! Rendering problems only cost the log line: they are reported through
//! `tracing` and the returned [`LogOutcome`], never by failing the caller.

use tracing::{debug, warn};

use crate::{
    error::RenderError,
    profiler::TimingSink,
    query::{ParameterSet, QueryRenderer, TypeHints},
    quote::ValueQuoter
};

/// What happened to a statement passed to [`QueryLogger::start_query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// Rendered and handed to the sink
    Started,
    /// EXPLAIN statement, not logged
    SkippedExplain,
    /// Rendering failed, not logged
    Failed(RenderError)
}

/// Renders executed statements into a timing sink
pub struct QueryLogger<Q, S: TimingSink> {
    label:   String,
    quoter:  Q,
    sink:    S,
    pending: Option<S::Handle>
}

impl<Q: ValueQuoter, S: TimingSink> QueryLogger<Q, S> {
    pub fn new(connection: &str, quoter: Q, sink: S) -> Self {
        Self {
            label: format!("Database ({})", connection),
            quoter,
            sink,
            pending: None
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Called before a statement executes
    pub fn start_query(
        &mut self,
        sql: &str,
        params: Option<&ParameterSet>,
        types: Option<&TypeHints>
    ) -> LogOutcome {
        if let Some(stale) = self.pending.take() {
            debug!(label = %self.label, "previous query was never stopped");
            self.sink.stop(stale);
        }

        let no_params = ParameterSet::default();
        let renderer = QueryRenderer::new(&self.quoter);
        match renderer.render(sql, params.unwrap_or(&no_params), types) {
            Ok(Some(rendered)) => {
                self.pending = Some(self.sink.start(&self.label, &rendered));
                LogOutcome::Started
            }
            Ok(None) => LogOutcome::SkippedExplain,
            Err(err) => {
                warn!(label = %self.label, error = %err, "skipping query log line");
                LogOutcome::Failed(err)
            }
        }
    }

    /// Called after the statement finished
    pub fn stop_query(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.sink.stop(handle);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(mut self) -> S {
        self.stop_query();
        self.sink
    }
}
