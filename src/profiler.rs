//! Timing sinks for logged queries.
//!
//! A sink receives `start` when a rendered statement begins executing and
//! `stop` with the returned handle when it finishes. Statements that are
//! never rendered (EXPLAIN, render failures) never reach the sink.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

/// Receiver of query start/stop events
pub trait TimingSink {
    type Handle;

    fn start(&mut self, label: &str, sql: &str) -> Self::Handle;

    fn stop(&mut self, handle: Self::Handle);
}

/// Recorded query timing
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEntry {
    pub label:      String,
    pub sql:        String,
    #[serde(skip)]
    pub started_at: Instant,
    /// `None` while the query is still running
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_elapsed")]
    pub elapsed:    Option<Duration>,
    #[serde(skip)]
    id:             u64
}

fn serialize_elapsed<S: serde::Serializer>(
    elapsed: &Option<Duration>,
    serializer: S
) -> Result<S::Ok, S::Error> {
    match elapsed {
        Some(d) => serializer.serialize_some(&(d.as_secs_f64() * 1000.0)),
        None => serializer.serialize_none()
    }
}

/// Handle into a [`Profiler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileHandle(u64);

/// In-memory sink keeping every entry.
///
/// Entries accumulate until taken with [`Profiler::drain_finished`];
/// long-lived embedders should drain periodically.
#[derive(Debug, Default)]
pub struct Profiler {
    entries: Vec<ProfileEntry>,
    next_id: u64
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ProfileEntry> {
        self.entries
    }

    /// Entries started but not stopped
    pub fn running(&self) -> usize {
        self.entries.iter().filter(|e| e.elapsed.is_none()).count()
    }

    /// Remove and return stopped entries in start order.
    ///
    /// Running entries stay, and their handles remain valid.
    pub fn drain_finished(&mut self) -> Vec<ProfileEntry> {
        let (finished, running) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.elapsed.is_some());
        self.entries = running;
        finished
    }
}

impl TimingSink for Profiler {
    type Handle = ProfileHandle;

    fn start(&mut self, label: &str, sql: &str) -> ProfileHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ProfileEntry {
            label:      label.to_string(),
            sql:        sql.to_string(),
            started_at: Instant::now(),
            elapsed:    None,
            id
        });
        ProfileHandle(id)
    }

    fn stop(&mut self, handle: ProfileHandle) {
        // Entries stay ordered by id; drained ones are simply not found
        let Ok(index) = self.entries.binary_search_by_key(&handle.0, |e| e.id) else {
            return;
        };
        let entry = &mut self.entries[index];
        if entry.elapsed.is_none() {
            entry.elapsed = Some(entry.started_at.elapsed());
        }
    }
}

/// Sink that emits one `tracing` event per finished query
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

/// Running query tracked by [`TracingSink`]
#[derive(Debug)]
pub struct TracingHandle {
    label:      String,
    sql:        String,
    started_at: Instant
}

impl TimingSink for TracingSink {
    type Handle = TracingHandle;

    fn start(&mut self, label: &str, sql: &str) -> TracingHandle {
        TracingHandle {
            label:      label.to_string(),
            sql:        sql.to_string(),
            started_at: Instant::now()
        }
    }

    fn stop(&mut self, handle: TracingHandle) {
        let elapsed = handle.started_at.elapsed();
        info!(
            target: "sql",
            label = %handle.label,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "{}",
            handle.sql
        );
    }
}
