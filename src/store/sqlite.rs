use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};
use tracing::{info, warn};

use crate::app::{Result, TicketFeedError};
use crate::domain::EventRecord;
use crate::store::{
    EventQuery, EventStore, PersistReport, RowFailure, RunRecord, StoredEvent,
};

const EVENT_COLUMNS: &str =
    "id, title, url, start_time, platform, image, event_type, location, event_date";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![
            M::up(include_str!("../../migrations/001-initial/up.sql")),
            M::up(include_str!("../../migrations/002-event-details/up.sql")),
            M::up(include_str!("../../migrations/003-run-log/up.sql")),
        ]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            TicketFeedError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_event(row: &Row<'_>) -> rusqlite::Result<StoredEvent> {
        Ok(StoredEvent {
            id: row.get(0)?,
            event: EventRecord {
                title: row.get(1)?,
                url: row.get(2)?,
                start_time: row.get(3)?,
                platform: row.get(4)?,
                image: row.get(5)?,
                event_type: row.get(6)?,
                location: row.get(7)?,
                event_date: row.get(8)?,
            },
        })
    }
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn filter_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EventStore for SqliteStore {
    fn replace_all(&self, events: &[EventRecord]) -> Result<PersistReport> {
        if events.is_empty() {
            warn!("No events to persist, keeping the existing rows");
            return Ok(PersistReport::default());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM events", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'events'", [])?;

        let mut report = PersistReport::default();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO events (title, url, start_time, platform, image, event_type, location, event_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(url) DO NOTHING",
            )?;

            for event in events {
                // A failed statement is rolled back on its own; the
                // transaction stays usable.
                match stmt.execute(params![
                    event.title,
                    event.url,
                    event.start_time,
                    event.platform,
                    event.image,
                    event.event_type,
                    event.location,
                    event.event_date,
                ]) {
                    Ok(0) => report.skipped += 1,
                    Ok(_) => report.written += 1,
                    Err(e) => {
                        warn!(title = %event.title, url = %event.url, error = %e, "Failed to insert event");
                        report.failures.push(RowFailure {
                            title: event.title.clone(),
                            url: event.url.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        tx.commit()?;
        info!(
            written = report.written,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Replaced stored events"
        );
        Ok(report)
    }

    fn query_events(&self, query: &EventQuery) -> Result<Vec<StoredEvent>> {
        let conn = self.conn()?;

        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(platform) = filter_value(&query.platform) {
            values.push(platform.to_string());
            clauses.push(format!("platform = ?{}", values.len()));
        }
        if let Some(title) = filter_value(&query.title) {
            values.push(format!("%{}%", escape_like(title)));
            clauses.push(format!("title LIKE ?{} ESCAPE '\\'", values.len()));
        }
        if let Some(event_type) = filter_value(&query.event_type) {
            values.push(format!("%{}%", escape_like(event_type)));
            clauses.push(format!("event_type LIKE ?{} ESCAPE '\\'", values.len()));
        }

        let mut sql = format!("SELECT {} FROM events", EVENT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY {} {}, id ASC",
            query.sort.column(),
            if query.descending { "DESC" } else { "ASC" }
        ));
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(events)
    }

    fn platform_counts(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT platform, COUNT(*) AS n FROM events
             GROUP BY platform ORDER BY n DESC, platform ASC",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    fn record_run(&self, run: &RunRecord) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO runs (started_at, finished_at, raw_count, unique_count, persisted_count,
                               adapters_ok, adapters_failed, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.raw_count as i64,
                run.unique_count as i64,
                run.persisted_count as i64,
                run.adapters_ok as i64,
                run.adapters_failed as i64,
                run.outcome,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn last_run(&self) -> Result<Option<RunRecord>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT started_at, finished_at, raw_count, unique_count, persisted_count,
                        adapters_ok, adapters_failed, outcome
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        started_at: row
                            .get::<_, String>(0)
                            .ok()
                            .and_then(|s| Self::parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                        finished_at: row
                            .get::<_, String>(1)
                            .ok()
                            .and_then(|s| Self::parse_datetime(&s))
                            .unwrap_or_else(Utc::now),
                        raw_count: row.get::<_, i64>(2)? as usize,
                        unique_count: row.get::<_, i64>(3)? as usize,
                        persisted_count: row.get::<_, i64>(4)? as usize,
                        adapters_ok: row.get::<_, i64>(5)? as usize,
                        adapters_failed: row.get::<_, i64>(6)? as usize,
                        outcome: row.get(7)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortColumn;
    use tempfile::tempdir;

    fn event(title: &str, url: &str, platform: &str) -> EventRecord {
        EventRecord::new(title, url, platform)
    }

    fn urls(store: &SqliteStore) -> Vec<String> {
        store
            .query_events(&EventQuery::default())
            .unwrap()
            .into_iter()
            .map(|e| e.event.url)
            .collect()
    }

    #[test]
    fn test_empty_input_is_noop() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .replace_all(&[
                event("Jazz Night", "https://a/1", "A"),
                event("Art Expo", "https://b/2", "B"),
            ])
            .unwrap();

        let report = store.replace_all(&[]).unwrap();
        assert_eq!(report, PersistReport::default());
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_full_refresh_replaces_rows() {
        let store = SqliteStore::in_memory().unwrap();
        store.replace_all(&[event("Old Show", "old", "A")]).unwrap();
        store.replace_all(&[event("New Show", "new", "A")]).unwrap();

        let rows = store.query_events(&EventQuery::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event.url, "new");
        // identity restarts with every refresh
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn test_duplicate_url_is_ignored() {
        let store = SqliteStore::in_memory().unwrap();
        let report = store
            .replace_all(&[
                event("Jazz Night", "https://a/1", "A"),
                event("Jazz Night Dup", "https://a/1", "B"),
            ])
            .unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());

        let rows = store.query_events(&EventQuery::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event.title, "Jazz Night");
    }

    #[test]
    fn test_bad_row_does_not_abort_batch() {
        let store = SqliteStore::in_memory().unwrap();
        let oversized = "x".repeat(300);
        let report = store
            .replace_all(&[
                event("Jazz Night", "https://a/1", "A"),
                event(&oversized, "https://a/2", "A"),
                event("Art Expo", "https://b/2", "B"),
            ])
            .unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "https://a/2");
        assert_eq!(urls(&store), vec!["https://a/1", "https://b/2"]);
    }

    #[test]
    fn test_query_filters_and_sort() {
        let store = SqliteStore::in_memory().unwrap();
        let mut concert = event("Jazz Night", "https://a/1", "KKTIX");
        concert.event_type = "concert".into();
        let mut expo = event("Art Expo 100%", "https://b/2", "寬宏");
        expo.event_type = "exhibition".into();
        let mut late = event("Late Jazz Session", "https://a/3", "KKTIX");
        late.event_type = "concert".into();
        store.replace_all(&[concert, expo, late]).unwrap();

        let kktix = store
            .query_events(&EventQuery {
                platform: Some("KKTIX".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(kktix.len(), 2);

        let jazz = store
            .query_events(&EventQuery {
                title: Some("jazz".into()),
                sort: SortColumn::Title,
                descending: true,
                ..Default::default()
            })
            .unwrap();
        let titles: Vec<_> = jazz.iter().map(|e| e.event.title.as_str()).collect();
        assert_eq!(titles, vec!["Late Jazz Session", "Jazz Night"]);

        let percent = store
            .query_events(&EventQuery {
                title: Some("100%".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(percent.len(), 1);

        let exhibitions = store
            .query_events(&EventQuery {
                event_type: Some("exhib".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(exhibitions.len(), 1);
        assert_eq!(exhibitions[0].event.platform, "寬宏");

        let limited = store
            .query_events(&EventQuery {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_platform_counts() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .replace_all(&[
                event("Jazz Night", "https://a/1", "KKTIX"),
                event("Art Expo", "https://b/2", "寬宏"),
                event("Late Jazz", "https://a/3", "KKTIX"),
            ])
            .unwrap();

        let counts = store.platform_counts().unwrap();
        assert_eq!(counts, vec![("KKTIX".to_string(), 2), ("寬宏".to_string(), 1)]);
    }

    #[test]
    fn test_run_log() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.last_run().unwrap().is_none());

        let started = Utc::now();
        let run = RunRecord {
            started_at: started,
            finished_at: started,
            raw_count: 10,
            unique_count: 8,
            persisted_count: 8,
            adapters_ok: 7,
            adapters_failed: 1,
            outcome: "persisted".into(),
        };
        store.record_run(&run).unwrap();
        let second = RunRecord {
            outcome: "skipped-empty".into(),
            persisted_count: 0,
            ..run.clone()
        };
        store.record_run(&second).unwrap();

        let last = store.last_run().unwrap().unwrap();
        assert_eq!(last.outcome, "skipped-empty");
        assert_eq!(last.raw_count, 10);
        assert_eq!(last.started_at.timestamp(), started.timestamp());
    }

    #[test]
    fn test_on_disk_store_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.replace_all(&[event("Jazz Night", "https://a/1", "A")]).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let rows = store.query_events(&EventQuery::default()).unwrap();
        assert_eq!(rows[0].event.location, "詳見內文");
    }
}
