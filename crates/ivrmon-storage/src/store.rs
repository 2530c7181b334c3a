use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ivrmon_common::types::{
    compose_complete_path, ChoiceCount, IvrPathRow, IvrStats, IvrStep, PathCount, StepEvent,
    StepEventRow, EMPTY_COMPLETE_PATH,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StorageError};
use crate::{IvrStore, PathQuery};

const IVR_INPUTS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ivr_inputs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_sid TEXT NOT NULL,
    from_number TEXT,
    to_number TEXT,
    step_name TEXT NOT NULL,
    digit_input TEXT,
    timestamp INTEGER NOT NULL,
    exophone TEXT,
    caller_circle TEXT
);
CREATE INDEX IF NOT EXISTS idx_inputs_call_sid ON ivr_inputs(call_sid);
CREATE INDEX IF NOT EXISTS idx_inputs_timestamp ON ivr_inputs(timestamp);
";

const IVR_PATHS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ivr_paths (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    call_sid TEXT NOT NULL UNIQUE,
    from_number TEXT,
    to_number TEXT,
    language_choice TEXT,
    state_choice TEXT,
    service_choice TEXT,
    model_choice TEXT,
    hp_choice TEXT,
    complete_path TEXT,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_paths_call_sid ON ivr_paths(call_sid);
CREATE INDEX IF NOT EXISTS idx_paths_timestamp ON ivr_paths(timestamp);
";

const PATH_COLUMNS: &str = "id, call_sid, from_number, to_number, language_choice, \
     state_choice, service_choice, model_choice, hp_choice, complete_path, timestamp";

const TOP_PATHS_LIMIT: usize = 10;

/// Single-file SQLite implementation of [`IvrStore`].
///
/// One connection behind a mutex; WAL mode so the reporting side can read
/// while the receiver writes within this process. At most one receiver
/// process may own the file at a time.
pub struct SqliteIvrStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteIvrStore {
    /// Opens (creating if necessary) the database file and its schema.
    /// Failure here is fatal to the receiver: no endpoint can be served
    /// without the store.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Other(format!("cannot create {}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(db_path).map_err(|source| StorageError::Open {
            path: db_path.display().to_string(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(IVR_INPUTS_SCHEMA)?;
        conn.execute_batch(IVR_PATHS_SCHEMA)?;
        tracing::info!(path = %db_path.display(), "Initialized IVR store");
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
        })
    }

    /// Path of the underlying database file, for diagnostics output.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn query_path(conn: &Connection, call_sid: &str) -> Result<Option<IvrPathRow>> {
        let sql = format!("SELECT {PATH_COLUMNS} FROM ivr_paths WHERE call_sid = ?1");
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query_map(rusqlite::params![call_sid], map_path_row)?;
        rows.next().transpose().map_err(StorageError::from)
    }

    fn choice_distribution(conn: &Connection, step: IvrStep) -> Result<Vec<ChoiceCount>> {
        let col = step.choice_column();
        let sql = format!(
            "SELECT {col}, COUNT(*) as count FROM ivr_paths
             WHERE {col} IS NOT NULL
             GROUP BY {col}
             ORDER BY count DESC, {col} ASC"
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], |row| {
            let choice: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((choice, count))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (choice, count) = row?;
            // The display label is attached by the reporting layer; the
            // store only knows the raw keypress value.
            out.push(ChoiceCount {
                label: choice.clone(),
                choice,
                count: count as u64,
            });
        }
        Ok(out)
    }
}

fn map_path_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IvrPathRow> {
    let ts_ms: i64 = row.get(10)?;
    Ok(IvrPathRow {
        id: row.get(0)?,
        call_sid: row.get(1)?,
        from_number: row.get(2)?,
        to_number: row.get(3)?,
        language_choice: row.get(4)?,
        state_choice: row.get(5)?,
        service_choice: row.get(6)?,
        model_choice: row.get(7)?,
        hp_choice: row.get(8)?,
        complete_path: row.get(9)?,
        timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
    })
}

fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn day_end_millis(date: NaiveDate) -> i64 {
    // Last millisecond of the day; keeps the upper bound inclusive.
    day_start_millis(date) + 86_400_000 - 1
}

impl IvrStore for SqliteIvrStore {
    fn record_event(&self, event: &StepEvent) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO ivr_inputs
             (call_sid, from_number, to_number, step_name, digit_input, timestamp, exophone, caller_circle)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        stmt.execute(rusqlite::params![
            &event.call_sid,
            &event.from_number,
            &event.to_number,
            &event.step_name,
            &event.digit_input,
            event.timestamp.timestamp_millis(),
            &event.exophone,
            &event.caller_circle,
        ])?;
        Ok(conn.last_insert_rowid())
    }

    fn upsert_path(
        &self,
        call_sid: &str,
        step: IvrStep,
        digit: Option<&str>,
        from_number: Option<&str>,
        to_number: Option<&str>,
    ) -> Result<IvrPathRow> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;
        let now_ms = Utc::now().timestamp_millis();

        let col = step.choice_column();
        let sql = format!(
            "INSERT INTO ivr_paths (call_sid, from_number, to_number, {col}, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(call_sid) DO UPDATE SET
                 {col} = excluded.{col},
                 from_number = COALESCE(ivr_paths.from_number, excluded.from_number),
                 to_number = COALESCE(ivr_paths.to_number, excluded.to_number),
                 timestamp = excluded.timestamp"
        );
        tx.execute(
            &sql,
            rusqlite::params![call_sid, from_number, to_number, digit, now_ms],
        )?;

        let mut row = Self::query_path(&tx, call_sid)?
            .ok_or(StorageError::InsertReadback { entity: "ivr_path" })?;
        let complete_path = compose_complete_path(row.choices());
        tx.execute(
            "UPDATE ivr_paths SET complete_path = ?1 WHERE call_sid = ?2",
            rusqlite::params![&complete_path, call_sid],
        )?;
        tx.commit()?;

        row.complete_path = Some(complete_path);
        Ok(row)
    }

    fn get_paths(&self, query: &PathQuery) -> Result<Vec<IvrPathRow>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = format!("SELECT {PATH_COLUMNS} FROM ivr_paths WHERE 1=1");
        let mut bounds: Vec<i64> = Vec::new();
        if let Some(start) = query.start_date {
            sql.push_str(" AND timestamp >= ?");
            bounds.push(day_start_millis(start));
        }
        if let Some(end) = query.end_date {
            sql.push_str(" AND timestamp <= ?");
            bounds.push(day_end_millis(end));
        }
        sql.push_str(" ORDER BY timestamp DESC, call_sid ASC");

        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bounds), map_path_row)?;
        let mut paths = Vec::new();
        for row in rows {
            paths.push(row?);
        }
        Ok(paths)
    }

    fn get_stats(&self) -> Result<IvrStats> {
        let conn = self.conn.lock().unwrap();

        let total_calls: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT call_sid) FROM ivr_inputs",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare_cached(
            "SELECT complete_path, COUNT(*) as count FROM ivr_paths
             WHERE complete_path IS NOT NULL AND complete_path != ?1
             GROUP BY complete_path
             ORDER BY count DESC, complete_path ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![EMPTY_COMPLETE_PATH, TOP_PATHS_LIMIT as i64],
            |row| {
                let path: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((path, count))
            },
        )?;
        let mut top_paths = Vec::new();
        for row in rows {
            let (path, count) = row?;
            top_paths.push(PathCount {
                path,
                count: count as u64,
            });
        }

        Ok(IvrStats {
            total_calls: total_calls as u64,
            top_paths,
            language_distribution: Self::choice_distribution(&conn, IvrStep::Language)?,
            state_distribution: Self::choice_distribution(&conn, IvrStep::State)?,
            service_distribution: Self::choice_distribution(&conn, IvrStep::Service)?,
        })
    }

    fn get_events(&self, call_sid: &str) -> Result<Vec<StepEventRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, call_sid, from_number, to_number, step_name, digit_input, timestamp, exophone, caller_circle
             FROM ivr_inputs WHERE call_sid = ?1
             ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt.query_map(rusqlite::params![call_sid], |row| {
            let ts_ms: i64 = row.get(6)?;
            Ok(StepEventRow {
                id: row.get(0)?,
                call_sid: row.get(1)?,
                from_number: row.get(2)?,
                to_number: row.get(3)?,
                step_name: row.get(4)?,
                digit_input: row.get(5)?,
                timestamp: DateTime::from_timestamp_millis(ts_ms).unwrap_or_default(),
                exophone: row.get(7)?,
                caller_circle: row.get(8)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}
