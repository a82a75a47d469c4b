//! Database module for per-user timetables and academic calendars.

mod types;

pub use types::{StoreError, StoredCalendar, StoredTimetable, UploadMeta};

use crate::model::{AcademicCalendar, CalendarEntry, ParseConfidence, Timetable};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_planner.sql");

type Result<T> = std::result::Result<T, StoreError>;

/// Hex SHA-256 of an upload, kept alongside what was parsed from it.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub struct PlannerDb {
    db: Mutex<Connection>,
}

impl PlannerDb {
    /// Opens (or creates) the database at `db_path` and initializes the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Stores the user's timetable, overwriting any previous one.
    pub fn replace_timetable(
        &self,
        user_id: &str,
        timetable: &Timetable,
        confidence: ParseConfidence,
        meta: UploadMeta,
    ) -> Result<StoredTimetable> {
        let timetable_json = serde_json::to_string(timetable).map_err(|e| StoreError::Corrupt {
            user_id: user_id.to_string(),
            message: e.to_string(),
        })?;
        let uploaded_at = Utc::now();

        let db = self.lock()?;
        db.execute(
            "INSERT OR REPLACE INTO timetables
                (user_id, timetable_json, confidence, source_file, content_sha256, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                user_id,
                &timetable_json,
                confidence.as_str(),
                &meta.source_file,
                &meta.content_sha256,
                uploaded_at,
            ),
        )?;
        info!(user_id = %user_id, confidence = confidence.as_str(), "Stored timetable");

        Ok(StoredTimetable {
            user_id: user_id.to_string(),
            timetable: timetable.clone(),
            confidence,
            meta,
            uploaded_at,
        })
    }

    pub fn get_timetable(&self, user_id: &str) -> Result<Option<StoredTimetable>> {
        let db = self.lock()?;
        let row = db
            .query_row(
                "SELECT timetable_json, confidence, source_file, content_sha256, uploaded_at
                 FROM timetables WHERE user_id = ?",
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, DateTime<Utc>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((json, confidence, source_file, content_sha256, uploaded_at)) = row else {
            return Ok(None);
        };
        let timetable = serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            user_id: user_id.to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(StoredTimetable {
            user_id: user_id.to_string(),
            timetable,
            confidence: ParseConfidence::from_str_lossy(&confidence),
            meta: UploadMeta {
                source_file,
                content_sha256,
            },
            uploaded_at,
        }))
    }

    /// Replaces the user's calendar header and all of its entries in one
    /// transaction.
    pub fn replace_calendar(
        &self,
        calendar: &AcademicCalendar,
        meta: UploadMeta,
    ) -> Result<StoredCalendar> {
        let uploaded_at = Utc::now();
        let user_id = calendar.user_id.as_str();

        let mut db = self.lock()?;
        let tx = db.transaction()?;
        tx.execute("DELETE FROM calendar_entries WHERE user_id = ?", [user_id])?;
        tx.execute(
            "INSERT OR REPLACE INTO academic_calendars
                (user_id, start_date, end_date, source_file, content_sha256, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                user_id,
                &calendar.start_date,
                &calendar.end_date,
                &meta.source_file,
                &meta.content_sha256,
                uploaded_at,
            ),
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calendar_entries (user_id, position, entry_date, day, holiday)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, entry) in calendar.entries.iter().enumerate() {
                stmt.execute((
                    user_id,
                    position as i64,
                    &entry.date,
                    &entry.day,
                    &entry.holiday,
                ))?;
            }
        }
        tx.commit()?;
        info!(
            user_id = %user_id,
            entries = calendar.entries.len(),
            "Stored academic calendar"
        );

        Ok(StoredCalendar {
            calendar: calendar.clone(),
            meta,
            uploaded_at,
        })
    }

    pub fn get_calendar(&self, user_id: &str) -> Result<Option<StoredCalendar>> {
        let db = self.lock()?;
        let header = db
            .query_row(
                "SELECT start_date, end_date, source_file, content_sha256, uploaded_at
                 FROM academic_calendars WHERE user_id = ?",
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, DateTime<Utc>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((start_date, end_date, source_file, content_sha256, uploaded_at)) = header else {
            return Ok(None);
        };

        let mut stmt = db.prepare(
            "SELECT entry_date, day, holiday FROM calendar_entries
             WHERE user_id = ? ORDER BY position",
        )?;
        let entries = stmt
            .query_map([user_id], |row| {
                Ok(CalendarEntry {
                    date: row.get(0)?,
                    day: row.get(1)?,
                    holiday: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(StoredCalendar {
            calendar: AcademicCalendar {
                user_id: user_id.to_string(),
                entries,
                start_date,
                end_date,
            },
            meta: UploadMeta {
                source_file,
                content_sha256,
            },
            uploaded_at,
        }))
    }

    /// Removes everything stored for the user. Returns whether anything
    /// existed.
    pub fn delete_user(&self, user_id: &str) -> Result<bool> {
        let mut db = self.lock()?;
        let tx = db.transaction()?;
        let timetables = tx.execute("DELETE FROM timetables WHERE user_id = ?", [user_id])?;
        let calendars = tx.execute("DELETE FROM academic_calendars WHERE user_id = ?", [user_id])?;
        let entries = tx.execute("DELETE FROM calendar_entries WHERE user_id = ?", [user_id])?;
        tx.commit()?;
        debug!(user_id = %user_id, timetables, calendars, entries, "Deleted user data");
        Ok(timetables + calendars > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_time_slots, Cell, DayName};

    fn meta(name: &str, bytes: &[u8]) -> UploadMeta {
        UploadMeta {
            source_file: Some(name.to_string()),
            content_sha256: content_digest(bytes),
        }
    }

    fn calendar(user_id: &str, entries: Vec<CalendarEntry>) -> AcademicCalendar {
        AcademicCalendar {
            user_id: user_id.to_string(),
            entries,
            start_date: Some("01.01.2025".to_string()),
            end_date: Some("30.04.2025".to_string()),
        }
    }

    #[test]
    fn test_digest_is_hex_sha256() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_timetable_round_trip_and_replace() {
        let db = PlannerDb::open_in_memory().unwrap();
        assert!(db.get_timetable("u1").unwrap().is_none());

        let slots = default_time_slots();
        let mut timetable = Timetable::blank(&DayName::WEEKDAYS, &slots);
        timetable.set(DayName::Monday, slots[0], Cell::Class("CSE 101".into()));
        db.replace_timetable("u1", &timetable, ParseConfidence::Structured, meta("a.txt", b"a"))
            .unwrap();

        let stored = db.get_timetable("u1").unwrap().unwrap();
        assert_eq!(stored.timetable, timetable);
        assert_eq!(stored.confidence, ParseConfidence::Structured);
        assert_eq!(stored.meta.source_file.as_deref(), Some("a.txt"));

        let blank = Timetable::blank(&DayName::WEEKDAYS, &slots);
        db.replace_timetable("u1", &blank, ParseConfidence::Empty, meta("b.txt", b"b"))
            .unwrap();
        let stored = db.get_timetable("u1").unwrap().unwrap();
        assert_eq!(stored.timetable, blank);
        assert_eq!(stored.confidence, ParseConfidence::Empty);
        assert_eq!(stored.meta.content_sha256, content_digest(b"b"));
    }

    #[test]
    fn test_calendar_replace_drops_old_entries() {
        let db = PlannerDb::open_in_memory().unwrap();
        let first = calendar(
            "u1",
            vec![
                CalendarEntry::new("02.01.2025", "Thursday", None),
                CalendarEntry::new("14.01.2025", "Tuesday", Some("Pongal".into())),
            ],
        );
        db.replace_calendar(&first, meta("cal.txt", b"1")).unwrap();
        assert_eq!(db.get_calendar("u1").unwrap().unwrap().calendar, first);

        let second = calendar(
            "u1",
            vec![CalendarEntry::new("31.03.2025", "Monday", Some("Eid".into()))],
        );
        db.replace_calendar(&second, meta("cal.txt", b"2")).unwrap();
        let stored = db.get_calendar("u1").unwrap().unwrap();
        assert_eq!(stored.calendar.entries, second.entries);
        assert_eq!(stored.calendar.start_date.as_deref(), Some("01.01.2025"));
    }

    #[test]
    fn test_users_are_isolated_and_deletable() {
        let db = PlannerDb::open_in_memory().unwrap();
        db.replace_calendar(
            &calendar("u1", vec![CalendarEntry::new("02.01.2025", "Thursday", None)]),
            meta("a", b"a"),
        )
        .unwrap();
        db.replace_calendar(&calendar("u2", vec![]), meta("b", b"b"))
            .unwrap();

        assert_eq!(db.get_calendar("u2").unwrap().unwrap().calendar.entries.len(), 0);
        assert!(db.delete_user("u1").unwrap());
        assert!(db.get_calendar("u1").unwrap().is_none());
        assert!(!db.delete_user("u1").unwrap());
        assert!(db.get_calendar("u2").unwrap().is_some());
    }
}
