use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::{GraphError, StoreError};
use crate::graph::KnowledgeGraph;
use crate::mastery::{MasteryRecord, OpenSession};
use crate::models::{Domain, MasteryLevel, Outcome, Topic};
use crate::review::ReviewItem;
use crate::student::{ProfileStore, StudentState};

type Result<T> = std::result::Result<T, StoreError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS mastery (
                student_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 0 CHECK(level BETWEEN 0 AND 4),
                recent_outcomes TEXT NOT NULL DEFAULT '[]',
                total_attempts INTEGER NOT NULL DEFAULT 0,
                total_correct INTEGER NOT NULL DEFAULT 0,
                sessions_completed INTEGER NOT NULL DEFAULT 0,
                open_session TEXT,
                last_session_accuracy REAL,
                streak INTEGER NOT NULL DEFAULT 0,
                criterion_met_at TEXT,
                novel_seen INTEGER NOT NULL DEFAULT 0,
                last_practiced TEXT,
                retention_checked_at TEXT,
                PRIMARY KEY (student_id, topic),
                FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS reviews (
                student_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                stage INTEGER,
                next_review TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                last_reviewed TEXT,
                last_outcome TEXT CHECK(last_outcome IN ('correct', 'incorrect')),
                times_reviewed INTEGER NOT NULL DEFAULT 0,
                times_correct INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (student_id, topic),
                FOREIGN KEY (student_id) REFERENCES students(id) ON DELETE CASCADE
            );

            -- Append-only practice log
            CREATE TABLE IF NOT EXISTS attempt_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                correct INTEGER NOT NULL,
                attempted_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS review_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                outcome TEXT NOT NULL CHECK(outcome IN ('correct', 'incorrect')),
                stage INTEGER,
                reviewed_at TEXT NOT NULL,
                next_review TEXT NOT NULL
            );

            -- Topics registered on top of the built-in sets
            CREATE TABLE IF NOT EXISTS custom_topics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                domain TEXT NOT NULL,
                description TEXT,
                difficulty REAL NOT NULL DEFAULT 0.5,
                estimated_hours REAL NOT NULL DEFAULT 1.0,
                tags TEXT NOT NULL DEFAULT '[]',
                concepts TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS custom_prerequisites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic TEXT NOT NULL,
                prerequisite TEXT NOT NULL,
                UNIQUE (topic, prerequisite)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_next_review ON reviews(next_review);
            CREATE INDEX IF NOT EXISTS idx_attempt_history_student ON attempt_history(student_id, topic);
            CREATE INDEX IF NOT EXISTS idx_review_history_student ON review_history(student_id, topic);
            "#,
        )?;

        Ok(())
    }

    // Graph operations

    /// Built-in topic sets plus everything registered through this database.
    pub fn load_graph(&self) -> Result<KnowledgeGraph> {
        let mut graph = KnowledgeGraph::with_builtin_topics()?;
        for topic in self.custom_topics()? {
            graph.add_topic(topic)?;
        }
        for (topic, prerequisite) in self.custom_prerequisites()? {
            graph.add_prerequisite(&topic, &prerequisite)?;
        }
        Ok(graph)
    }

    /// Persists `topic` and adds it to `graph`. Nothing changes on either
    /// side if the graph would reject it or the insert fails.
    pub fn register_topic(&self, graph: &mut KnowledgeGraph, topic: Topic) -> Result<()> {
        if graph.contains(&topic.key) {
            return Err(GraphError::DuplicateTopic(topic.key).into());
        }

        let tags = serde_json::to_string(&topic.tags)?;
        let concepts = serde_json::to_string(&topic.concepts)?;
        self.conn.execute(
            r#"
            INSERT INTO custom_topics
                (key, name, domain, description, difficulty, estimated_hours, tags, concepts)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                topic.key,
                topic.name,
                topic.domain.as_str(),
                topic.description,
                topic.difficulty,
                topic.estimated_hours,
                tags,
                concepts
            ],
        )?;

        tracing::info!(topic = %topic.key, "registered topic");
        graph.add_topic(topic)?;
        Ok(())
    }

    /// Persists the edge and adds it to `graph`, with the same all-or-nothing
    /// behaviour as [`register_topic`](Self::register_topic).
    pub fn register_prerequisite(
        &self,
        graph: &mut KnowledgeGraph,
        topic: &str,
        prerequisite: &str,
    ) -> Result<()> {
        if !graph.check_prerequisite(topic, prerequisite)? {
            return Ok(());
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO custom_prerequisites (topic, prerequisite) VALUES (?1, ?2)",
            params![topic, prerequisite],
        )?;

        tracing::info!(topic, prerequisite, "registered prerequisite");
        graph.add_prerequisite(topic, prerequisite)?;
        Ok(())
    }

    pub fn custom_topics(&self) -> Result<Vec<Topic>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT key, name, domain, description, difficulty, estimated_hours, tags, concepts
            FROM custom_topics
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut topics = Vec::new();
        for row in rows {
            let (key, name, domain, description, difficulty, hours, tags, concepts) = row?;
            let mut topic = Topic::new(key, name, Domain::from_str(&domain))
                .with_difficulty(difficulty)
                .with_estimated_hours(hours);
            topic.description = description;
            topic.tags = serde_json::from_str(&tags)?;
            topic.concepts = serde_json::from_str(&concepts)?;
            topics.push(topic);
        }

        Ok(topics)
    }

    pub fn custom_prerequisites(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT topic, prerequisite FROM custom_prerequisites ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // History

    pub fn log_attempt(
        &self,
        student_id: &str,
        topic: &str,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO attempt_history (student_id, topic, correct, attempted_at) VALUES (?1, ?2, ?3, ?4)",
            params![student_id, topic, correct, at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn log_review(&self, student_id: &str, topic: &str, item: &ReviewItem) -> Result<()> {
        let (outcome, reviewed_at) = match (item.last_outcome, item.last_reviewed) {
            (Some(o), Some(at)) => (o, at),
            _ => {
                return Err(StoreError::Corrupt(format!(
                    "review item for '{}' has never been reviewed",
                    topic
                )))
            }
        };

        self.conn.execute(
            r#"
            INSERT INTO review_history (student_id, topic, outcome, stage, reviewed_at, next_review)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                student_id,
                topic,
                outcome.as_str(),
                item.stage.map(|s| s as i64),
                reviewed_at.to_rfc3339(),
                item.next_review.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Most recent reviews of a topic, newest first.
    pub fn recent_reviews(
        &self,
        student_id: &str,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<ReviewLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT outcome, stage, reviewed_at, next_review
            FROM review_history
            WHERE student_id = ?1 AND topic = ?2
            ORDER BY reviewed_at DESC, id DESC
            LIMIT ?3
            "#,
        )?;

        let rows = stmt.query_map(params![student_id, topic, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (outcome, stage, reviewed_at, next_review) = row?;
            logs.push(ReviewLog {
                outcome: parse_outcome(&outcome)?,
                stage: stage.map(parse_stage).transpose()?,
                reviewed_at: parse_ts(&reviewed_at)?,
                next_review: parse_ts(&next_review)?,
            });
        }

        Ok(logs)
    }

    pub fn attempt_count(&self, student_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM attempt_history WHERE student_id = ?1",
            params![student_id],
            |row| row.get(0),
        )?)
    }

    pub fn list_students(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM students ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    fn load_mastery(&self, student_id: &str, state: &mut StudentState) -> Result<()> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT topic, level, recent_outcomes, total_attempts, total_correct, sessions_completed,
                   open_session, last_session_accuracy, streak, criterion_met_at, novel_seen,
                   last_practiced, retention_checked_at
            FROM mastery
            WHERE student_id = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![student_id], |row| {
            Ok(MasteryRow {
                topic: row.get(0)?,
                level: row.get(1)?,
                window: row.get(2)?,
                total_attempts: row.get(3)?,
                total_correct: row.get(4)?,
                sessions_completed: row.get(5)?,
                open_session: row.get(6)?,
                last_session_accuracy: row.get(7)?,
                streak: row.get(8)?,
                criterion_met_at: row.get(9)?,
                novel_seen: row.get(10)?,
                last_practiced: row.get(11)?,
                retention_checked_at: row.get(12)?,
            })
        })?;

        for row in rows {
            let (topic, record) = row?.into_record()?;
            state.mastery.insert(topic, record);
        }
        Ok(())
    }

    fn load_reviews(&self, student_id: &str, state: &mut StudentState) -> Result<()> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT topic, stage, next_review, scheduled_at, last_reviewed, last_outcome,
                   times_reviewed, times_correct
            FROM reviews
            WHERE student_id = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![student_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, u32>(7)?,
            ))
        })?;

        for row in rows {
            let (topic, stage, next_review, scheduled_at, last_reviewed, last_outcome, reviewed, correct) =
                row?;
            let item = ReviewItem {
                stage: stage.map(parse_stage).transpose()?,
                next_review: parse_ts(&next_review)?,
                scheduled_at: parse_ts(&scheduled_at)?,
                last_reviewed: parse_opt_ts(last_reviewed.as_deref())?,
                last_outcome: last_outcome.as_deref().map(parse_outcome).transpose()?,
                times_reviewed: reviewed,
                times_correct: correct,
            };
            state.reviews.insert(topic, item);
        }
        Ok(())
    }
}

impl ProfileStore for Database {
    fn load(&self, student_id: &str) -> Result<StudentState> {
        let mut state = StudentState::new(student_id);
        self.load_mastery(student_id, &mut state)?;
        self.load_reviews(student_id, &mut state)?;
        tracing::debug!(
            student = student_id,
            topics = state.mastery.len(),
            reviews = state.reviews.len(),
            "loaded profile"
        );
        Ok(state)
    }

    /// Replaces the stored profile with `state` in one transaction.
    fn save(&self, state: &StudentState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let id = state.student_id.as_str();

        tx.execute(
            r#"
            INSERT INTO students (id) VALUES (?1)
            ON CONFLICT(id) DO UPDATE SET updated_at = datetime('now')
            "#,
            params![id],
        )?;
        tx.execute("DELETE FROM mastery WHERE student_id = ?1", params![id])?;
        tx.execute("DELETE FROM reviews WHERE student_id = ?1", params![id])?;

        for (topic, r) in &state.mastery {
            let open_session = r
                .session
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            tx.execute(
                r#"
                INSERT INTO mastery (
                    student_id, topic, level, recent_outcomes, total_attempts, total_correct,
                    sessions_completed, open_session, last_session_accuracy, streak,
                    criterion_met_at, novel_seen, last_practiced, retention_checked_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    id,
                    topic,
                    r.level.as_i32(),
                    serde_json::to_string(&r.window)?,
                    r.total_attempts,
                    r.total_correct,
                    r.sessions_completed,
                    open_session,
                    r.last_session_accuracy,
                    r.streak,
                    r.criterion_met_at.map(|t| t.to_rfc3339()),
                    r.novel_seen,
                    r.last_practiced.map(|t| t.to_rfc3339()),
                    r.retention_checked_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }

        for (topic, item) in &state.reviews {
            tx.execute(
                r#"
                INSERT INTO reviews (
                    student_id, topic, stage, next_review, scheduled_at, last_reviewed,
                    last_outcome, times_reviewed, times_correct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    id,
                    topic,
                    item.stage.map(|s| s as i64),
                    item.next_review.to_rfc3339(),
                    item.scheduled_at.to_rfc3339(),
                    item.last_reviewed.map(|t| t.to_rfc3339()),
                    item.last_outcome.map(|o| o.as_str()),
                    item.times_reviewed,
                    item.times_correct,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewLog {
    pub outcome: Outcome,
    pub stage: Option<usize>,
    pub reviewed_at: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
}

struct MasteryRow {
    topic: String,
    level: i32,
    window: String,
    total_attempts: u32,
    total_correct: u32,
    sessions_completed: u32,
    open_session: Option<String>,
    last_session_accuracy: Option<f64>,
    streak: u32,
    criterion_met_at: Option<String>,
    novel_seen: bool,
    last_practiced: Option<String>,
    retention_checked_at: Option<String>,
}

impl MasteryRow {
    fn into_record(self) -> Result<(String, MasteryRecord)> {
        let session: Option<OpenSession> = self
            .open_session
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let record = MasteryRecord {
            level: MasteryLevel::from_i32(self.level),
            window: serde_json::from_str(&self.window)?,
            total_attempts: self.total_attempts,
            total_correct: self.total_correct,
            sessions_completed: self.sessions_completed,
            session,
            last_session_accuracy: self.last_session_accuracy,
            streak: self.streak,
            criterion_met_at: parse_opt_ts(self.criterion_met_at.as_deref())?,
            novel_seen: self.novel_seen,
            last_practiced: parse_opt_ts(self.last_practiced.as_deref())?,
            retention_checked_at: parse_opt_ts(self.retention_checked_at.as_deref())?,
        };
        Ok((self.topic, record))
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}

fn parse_opt_ts(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(parse_ts).transpose()
}

fn parse_outcome(s: &str) -> Result<Outcome> {
    Outcome::from_str(s).ok_or_else(|| StoreError::Corrupt(format!("bad outcome '{}'", s)))
}

fn parse_stage(stage: i64) -> Result<usize> {
    usize::try_from(stage).map_err(|_| StoreError::Corrupt(format!("bad review stage {}", stage)))
}
