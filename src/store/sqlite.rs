use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{LensError, Result};
use crate::domain::{ReviewRecord, RunStatus, ScrapeRun, Sentiment, SentimentSummary};
use crate::store::Store;

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
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| LensError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            LensError::Database(rusqlite::Error::SqliteFailure(
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

    fn run_from_row(row: &Row<'_>) -> rusqlite::Result<ScrapeRun> {
        Ok(ScrapeRun {
            id: row.get(0)?,
            source: row.get(1)?,
            status: RunStatus::parse(&row.get::<_, String>(2)?),
            fragment_count: row.get::<_, i64>(3)?.max(0) as usize,
            record_count: row.get::<_, i64>(4)?.max(0) as usize,
            error: row.get(5)?,
            started_at: row
                .get::<_, String>(6)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            finished_at: row
                .get::<_, Option<String>>(7)?
                .and_then(|s| Self::parse_datetime(&s)),
        })
    }

    fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRecord> {
        let sentiment: String = row.get(1)?;
        Ok(ReviewRecord {
            text: row.get(0)?,
            sentiment: sentiment.parse().unwrap_or(Sentiment::Neutral),
            confidence: row.get::<_, f64>(2)? as f32,
            source: row.get(3)?,
            user_id: row.get(4)?,
            location: row.get(5)?,
            captured_at: row
                .get::<_, String>(6)
                .ok()
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(Local::now),
        })
    }
}

const RUN_COLUMNS: &str =
    "id, source, status, fragment_count, record_count, error, started_at, finished_at";

impl Store for SqliteStore {
    fn create_run(&self, run: &ScrapeRun) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO scrape_runs (source, status, fragment_count, record_count, error, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.source,
                run.status.as_str(),
                run.fragment_count as i64,
                run.record_count as i64,
                run.error,
                run.started_at.to_rfc3339()
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn finish_run(&self, id: i64, fragment_count: usize, record_count: usize) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE scrape_runs
             SET status = ?1, fragment_count = ?2, record_count = ?3, finished_at = ?4
             WHERE id = ?5",
            params![
                RunStatus::Completed.as_str(),
                fragment_count as i64,
                record_count as i64,
                Utc::now().to_rfc3339(),
                id
            ],
        )?;

        if updated == 0 {
            return Err(LensError::RunNotFound(id));
        }
        Ok(())
    }

    fn fail_run(&self, id: i64, error: &str) -> Result<()> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE scrape_runs SET status = ?1, error = ?2, finished_at = ?3 WHERE id = ?4",
            params![RunStatus::Failed.as_str(), error, Utc::now().to_rfc3339(), id],
        )?;

        if updated == 0 {
            return Err(LensError::RunNotFound(id));
        }
        Ok(())
    }

    fn get_run(&self, id: i64) -> Result<Option<ScrapeRun>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM scrape_runs WHERE id = ?1", RUN_COLUMNS),
                params![id],
                Self::run_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn list_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], Self::run_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    fn delete_run(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM scrape_runs WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn add_reviews(&self, run_id: i64, records: &[ReviewRecord]) -> Result<usize> {
        let mut conn = self.conn()?;

        let tx = conn.transaction()?;
        let mut count = 0;

        for (position, record) in records.iter().enumerate() {
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO reviews
                 (id, run_id, position, text, sentiment, confidence, source, user_id, location, captured_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    ReviewRecord::generate_id(run_id, &record.text),
                    run_id,
                    position as i64,
                    record.text,
                    record.sentiment.as_str(),
                    record.confidence as f64,
                    record.source,
                    record.user_id,
                    record.location,
                    record.captured_at.to_rfc3339()
                ],
            )?;
            count += inserted;
        }

        tx.commit()?;
        Ok(count)
    }

    fn get_reviews(&self, run_id: i64) -> Result<Vec<ReviewRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT text, sentiment, confidence, source, user_id, location, captured_at
             FROM reviews WHERE run_id = ?1 ORDER BY position",
        )?;

        let reviews = stmt
            .query_map(params![run_id], Self::review_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    fn sentiment_counts(&self, run_id: i64) -> Result<SentimentSummary> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT sentiment, COUNT(*) FROM reviews WHERE run_id = ?1 GROUP BY sentiment")?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut summary = SentimentSummary::default();
        for row in rows {
            let (sentiment, count) = row?;
            let count = count.max(0) as usize;
            match sentiment.parse::<Sentiment>() {
                Ok(Sentiment::Positive) => summary.positive += count,
                Ok(Sentiment::Negative) => summary.negative += count,
                Ok(Sentiment::Neutral) | Err(_) => summary.neutral += count,
            }
        }

        Ok(summary)
    }
}
