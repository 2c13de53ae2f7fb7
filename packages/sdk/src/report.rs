//! Error Reports
//!
//! The wire shape a page reports runtime errors with, and the client-side
//! guard that keeps one position from being reported twice concurrently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::resolver::ResolveQuery;

/// Which handler captured the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    #[serde(rename = "onerror")]
    OnError,
    #[serde(rename = "addEventListener")]
    AddEventListener,
    #[serde(rename = "unhandledrejection")]
    UnhandledRejection,
}

impl ReportKind {
    /// The wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::OnError => "onerror",
            ReportKind::AddEventListener => "addEventListener",
            ReportKind::UnhandledRejection => "unhandledrejection",
        }
    }
}

/// A captured runtime error. Rejection reports carry no position and use
/// `-1` for both `lineno` and `colno`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub lineno: i64,
    pub colno: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stack: String,
}

impl From<&ErrorReport> for ResolveQuery {
    fn from(report: &ErrorReport) -> Self {
        ResolveQuery {
            line: report.lineno,
            column: report.colno,
        }
    }
}

/// Positions with a report currently in flight.
///
/// An entry exists from `begin` until `finish`, so the same position is
/// reported at most once at a time. Finishing always clears the entry,
/// whether the report was delivered or not, and a later report for the
/// same position goes through again. Single consumer, like the browser
/// client it mirrors; any transport owns its own synchronization.
#[derive(Debug, Default)]
pub struct InflightReports {
    pending: HashSet<(i64, i64)>,
}

impl InflightReports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the report's position as in flight. Returns `false` when a
    /// report for the same position is already pending and this one
    /// should be dropped.
    pub fn begin(&mut self, report: &ErrorReport) -> bool {
        self.pending.insert((report.lineno, report.colno))
    }

    /// Clears the position once the report completed.
    pub fn finish(&mut self, report: &ErrorReport) {
        self.pending.remove(&(report.lineno, report.colno));
    }

    pub fn is_pending(&self, report: &ErrorReport) -> bool {
        self.pending.contains(&(report.lineno, report.colno))
    }
}
