//! Embedded storage layer for IVR keypress data.
//!
//! The default implementation ([`store::SqliteIvrStore`]) keeps two tables
//! in one SQLite file opened in WAL mode: `ivr_inputs` (raw per-step
//! events, append-only) and `ivr_paths` (one mutable row per call,
//! keyed by the vendor call identifier). The webhook receiver writes,
//! the merge/report layer reads; both run in the same process and the
//! connection mutex serializes writers.

pub mod error;
pub mod store;


use chrono::NaiveDate;
use ivrmon_common::types::{IvrPathRow, IvrStats, IvrStep, StepEvent, StepEventRow};

use crate::error::Result;

/// Optional calendar-date bounds for a path query. Both bounds are
/// inclusive and cover whole days against the row's last-updated
/// timestamp.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ivrmon_storage::PathQuery;
///
/// let query = PathQuery {
///     start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
///     end_date: NaiveDate::from_ymd_opt(2025, 6, 30),
/// };
/// assert!(query.start_date.is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PathQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Persistence backend for IVR events and aggregated paths.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because the store is reached from every request handler concurrently.
pub trait IvrStore: Send + Sync {
    /// Appends one raw step event unconditionally and returns its row id.
    /// Duplicate events (retried vendor notifications) are valid and are
    /// not deduplicated at this layer.
    fn record_event(&self, event: &StepEvent) -> Result<i64>;

    /// Inserts or updates the path row for `call_sid`: sets the choice
    /// column for `step`, backfills the caller/callee numbers if they are
    /// still null, refreshes the last-updated timestamp and recomputes
    /// the complete-path string. Returns the row as stored.
    fn upsert_path(
        &self,
        call_sid: &str,
        step: IvrStep,
        digit: Option<&str>,
        from_number: Option<&str>,
        to_number: Option<&str>,
    ) -> Result<IvrPathRow>;

    /// Returns path rows whose last-updated timestamp falls within the
    /// query's inclusive date bounds, most recent first. Rows sharing a
    /// timestamp are ordered by `call_sid` ascending so the result is
    /// stable.
    fn get_paths(&self, query: &PathQuery) -> Result<Vec<IvrPathRow>>;

    /// Aggregate counters: total distinct calls seen by the webhook, the
    /// top complete paths (the never-answered `----` path excluded) and
    /// per-step choice distributions.
    fn get_stats(&self) -> Result<IvrStats>;

    /// Raw step events for one call, oldest first.
    fn get_events(&self, call_sid: &str) -> Result<Vec<StepEventRow>>;
}
