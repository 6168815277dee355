//! Pathfinder Store
//!
//! SQLite persistence for sessions, quizzes, career tracks and roadmaps.
//! List-valued fields (questions, answers, skills, tools, weeks) are stored
//! as JSON text.

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{
    CareerTrack, Question, Quiz, QuizAnswer, Roadmap, RoadmapWeek, Session, SkillLevel,
    TrackRecommendation,
};

const SESSION_COLUMNS: &str = "session_id, domain, level, created_at";
const TRACK_COLUMNS: &str = "id, session_id, title, avg_salary, skills, tools, growth, is_enrolled";
const ROADMAP_COLUMNS: &str = "id, session_id, track_id, weeks";

/// Store with SQLite backend
pub struct PathfinderStore {
    conn: Connection,
}

impl PathfinderStore {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;

        info!("Pathfinder store opened: {}", path.display());
        Ok(store)
    }

    /// In-memory store, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                domain TEXT NOT NULL,
                level TEXT CHECK(level IN ('Beginner', 'Intermediate', 'Advanced')),
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quizzes (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES sessions(session_id),
                questions TEXT NOT NULL,
                answers TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS career_tracks (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES sessions(session_id),
                title TEXT NOT NULL,
                avg_salary TEXT NOT NULL,
                skills TEXT NOT NULL,
                tools TEXT NOT NULL,
                growth TEXT NOT NULL,
                is_enrolled INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                UNIQUE(session_id, title)
            );

            CREATE TABLE IF NOT EXISTS roadmaps (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES sessions(session_id),
                track_id TEXT NOT NULL REFERENCES career_tracks(id),
                weeks TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_quizzes_session ON quizzes(session_id);
            CREATE INDEX IF NOT EXISTS idx_tracks_session ON career_tracks(session_id);
            CREATE INDEX IF NOT EXISTS idx_roadmaps_track ON roadmaps(track_id);
            CREATE INDEX IF NOT EXISTS idx_roadmaps_session
                ON roadmaps(session_id, created_at DESC);
            "#,
        )?;

        Ok(())
    }

    // ---- sessions ----

    /// Start a session for a domain
    pub fn create_session(&self, domain: &str) -> Result<Session> {
        let now = chrono::Utc::now();
        let session = Session {
            session_id: new_id(),
            domain: domain.to_string(),
            level: None,
            created_at: now,
        };

        self.conn.execute(
            "INSERT INTO sessions (session_id, domain, level, created_at) VALUES (?1, ?2, NULL, ?3)",
            params![session.session_id, session.domain, now.timestamp_millis()],
        )?;

        debug!("Created session {} for {}", session.session_id, domain);
        Ok(session)
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sessions WHERE session_id = ?1", SESSION_COLUMNS),
                params![session_id],
                session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    /// All sessions, newest first
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sessions ORDER BY created_at DESC, rowid DESC",
            SESSION_COLUMNS
        ))?;

        let sessions = stmt
            .query_map([], session_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Record the detected level. Returns false for an unknown session.
    pub fn set_level(&self, session_id: &str, level: SkillLevel) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE sessions SET level = ?1 WHERE session_id = ?2",
            params![level.as_str(), session_id],
        )?;
        Ok(rows > 0)
    }

    // ---- quizzes ----

    pub fn create_quiz(&self, session_id: &str, questions: &[Question]) -> Result<Quiz> {
        let quiz = Quiz {
            id: new_id(),
            session_id: session_id.to_string(),
            questions: questions.to_vec(),
            answers: Vec::new(),
        };

        self.conn.execute(
            "INSERT INTO quizzes (id, session_id, questions, answers, created_at)
             VALUES (?1, ?2, ?3, '[]', ?4)",
            params![
                quiz.id,
                quiz.session_id,
                to_json(&quiz.questions)?,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;

        debug!("Created quiz {} with {} questions", quiz.id, questions.len());
        Ok(quiz)
    }

    pub fn get_quiz(&self, quiz_id: &str) -> Result<Option<Quiz>> {
        let quiz = self
            .conn
            .query_row(
                "SELECT id, session_id, questions, answers FROM quizzes WHERE id = ?1",
                params![quiz_id],
                |row| {
                    Ok(Quiz {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        questions: json_column(row, 2)?,
                        answers: json_column(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(quiz)
    }

    /// Replace the answers of a quiz. Returns false for an unknown quiz.
    pub fn save_answers(&self, quiz_id: &str, answers: &[QuizAnswer]) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE quizzes SET answers = ?1 WHERE id = ?2",
            params![to_json(&answers)?, quiz_id],
        )?;
        Ok(rows > 0)
    }

    // ---- career tracks ----

    /// Insert or refresh a track by (session, title).
    ///
    /// An existing track keeps its id and enrollment; the descriptive fields
    /// are overwritten with the new recommendation.
    pub fn upsert_track(&self, session_id: &str, track: &TrackRecommendation) -> Result<CareerTrack> {
        self.conn.execute(
            "INSERT INTO career_tracks
                (id, session_id, title, avg_salary, skills, tools, growth, is_enrolled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
             ON CONFLICT(session_id, title) DO UPDATE SET
                avg_salary = excluded.avg_salary,
                skills = excluded.skills,
                tools = excluded.tools,
                growth = excluded.growth",
            params![
                new_id(),
                session_id,
                track.title,
                track.avg_salary,
                to_json(&track.skills)?,
                to_json(&track.tools)?,
                track.growth,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;

        let stored = self.conn.query_row(
            &format!(
                "SELECT {} FROM career_tracks WHERE session_id = ?1 AND title = ?2",
                TRACK_COLUMNS
            ),
            params![session_id, track.title],
            track_from_row,
        )?;

        debug!("Upserted track {} ({})", stored.id, stored.title);
        Ok(stored)
    }

    pub fn get_track(&self, track_id: &str) -> Result<Option<CareerTrack>> {
        let track = self
            .conn
            .query_row(
                &format!("SELECT {} FROM career_tracks WHERE id = ?1", TRACK_COLUMNS),
                params![track_id],
                track_from_row,
            )
            .optional()?;
        Ok(track)
    }

    /// Tracks of a session in recommendation order
    pub fn list_tracks(&self, session_id: &str) -> Result<Vec<CareerTrack>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM career_tracks WHERE session_id = ?1 ORDER BY created_at, rowid",
            TRACK_COLUMNS
        ))?;

        let tracks = stmt
            .query_map(params![session_id], track_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    /// Set enrollment and return the updated track, or None if unknown
    pub fn set_enrollment(&self, track_id: &str, enrolled: bool) -> Result<Option<CareerTrack>> {
        let rows = self.conn.execute(
            "UPDATE career_tracks SET is_enrolled = ?1 WHERE id = ?2",
            params![enrolled, track_id],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        self.get_track(track_id)
    }

    // ---- roadmaps ----

    pub fn insert_roadmap(&self, session_id: &str, track_id: &str, weeks: &[RoadmapWeek]) -> Result<Roadmap> {
        let roadmap = Roadmap {
            id: new_id(),
            session_id: session_id.to_string(),
            track_id: track_id.to_string(),
            weeks: weeks.to_vec(),
        };

        self.conn.execute(
            "INSERT INTO roadmaps (id, session_id, track_id, weeks, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                roadmap.id,
                roadmap.session_id,
                roadmap.track_id,
                to_json(&roadmap.weeks)?,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;

        info!("Stored {}-week roadmap for track {}", weeks.len(), track_id);
        Ok(roadmap)
    }

    pub fn get_roadmap_for_track(&self, track_id: &str) -> Result<Option<Roadmap>> {
        self.latest_roadmap("track_id", track_id)
    }

    /// Most recent roadmap of a session
    pub fn get_roadmap_for_session(&self, session_id: &str) -> Result<Option<Roadmap>> {
        self.latest_roadmap("session_id", session_id)
    }

    /// Overwrite the weeks of a stored roadmap. Returns false if unknown.
    pub fn replace_roadmap_weeks(&self, roadmap_id: &str, weeks: &[RoadmapWeek]) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE roadmaps SET weeks = ?1 WHERE id = ?2",
            params![to_json(&weeks)?, roadmap_id],
        )?;
        Ok(rows > 0)
    }

    fn latest_roadmap(&self, column: &'static str, value: &str) -> Result<Option<Roadmap>> {
        let roadmap = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM roadmaps WHERE {} = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    ROADMAP_COLUMNS, column
                ),
                params![value],
                |row| {
                    Ok(Roadmap {
                        id: row.get(0)?,
                        session_id: row.get(1)?,
                        track_id: row.get(2)?,
                        weeks: json_column(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(roadmap)
    }

    /// Row counts per table
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            sessions: count("sessions")?,
            quizzes: count("quizzes")?,
            tracks: count("career_tracks")?,
            roadmaps: count("roadmaps")?,
        })
    }
}

/// Global store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub sessions: usize,
    pub quizzes: usize,
    pub tracks: usize,
    pub roadmaps: usize,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to encode column")
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let level: Option<String> = row.get(2)?;
    let created_ms: i64 = row.get(3)?;

    Ok(Session {
        session_id: row.get(0)?,
        domain: row.get(1)?,
        level: level.and_then(|l| l.parse().ok()),
        created_at: chrono::DateTime::from_timestamp_millis(created_ms).unwrap_or_default(),
    })
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<CareerTrack> {
    Ok(CareerTrack {
        id: row.get(0)?,
        session_id: row.get(1)?,
        title: row.get(2)?,
        avg_salary: row.get(3)?,
        skills: json_column(row, 4)?,
        tools: json_column(row, 5)?,
        growth: row.get(6)?,
        is_enrolled: row.get(7)?,
    })
}
