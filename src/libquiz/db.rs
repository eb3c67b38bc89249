use crate::libquiz::error::{Error, Result};
use crate::libquiz::pack::{ContentPack, Lesson};
use crate::libquiz::record::{QuizMeta, QuizRecord, VariantRecord};
use crate::libquiz::registry::Registry;
use log::{debug, error, info, warn};
use rusqlite::types::Type;
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

const CLOSE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRow {
    pub slug: String,
    pub title: String,
}

/// A quiz as kept in the content database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuiz {
    pub lesson_slug: String,
    pub position: i64,
    pub record: QuizRecord,
}

/// What [`import_pack`] did with a content pack.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub lessons_added: usize,
    pub quizzes_added: usize,
    pub skipped: Vec<Error>,
}

fn to_json_column<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

impl LessonRow {
    pub fn new(connection: &Connection, slug: &str, title: &str) -> Result<()> {
        match connection.execute(
            "INSERT INTO Lesson(slug, title) VALUES (?1, ?2)",
            params![slug, title],
        ) {
            Ok(_) => {
                debug!("[DB] Created new Lesson '{}'", slug);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while creating new Lesson: {:?}", err);
                Err(err.into())
            }
        }
    }

    pub fn add(connection: &Connection, src: &LessonRow) -> Result<()> {
        Self::new(connection, &src.slug, &src.title)
    }

    fn from_row(row: &Row) -> rusqlite::Result<LessonRow> {
        Ok(LessonRow {
            slug: row.get(0)?,
            title: row.get(1)?,
        })
    }

    pub fn get_all(connection: &Connection) -> Result<Vec<LessonRow>> {
        let mut statement = connection.prepare("SELECT slug, title FROM Lesson ORDER BY rowid")?;
        let rows = statement.query_map([], Self::from_row)?;

        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    pub fn get_one(connection: &Connection, slug: &str) -> Result<Option<LessonRow>> {
        let mut statement =
            connection.prepare("SELECT slug, title FROM Lesson WHERE slug = ?1 LIMIT 1")?;
        Ok(statement.query_row(params![slug], Self::from_row).optional()?)
    }
}

impl StoredQuiz {
    /// Inserts the quiz row and its variants. The caller decides whether the
    /// record is valid and whether the name is free.
    pub fn add(connection: &Connection, lesson_slug: &str, record: &QuizRecord) -> Result<i64> {
        let position: i64 = connection.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM Quiz WHERE lessonSlug = ?1",
            params![lesson_slug],
            |row| row.get(0),
        )?;
        connection.execute(
            "INSERT INTO Quiz(name, lessonSlug, position, question, correctAnswers) \
            VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.name,
                lesson_slug,
                position,
                to_json_column(&record.question)?,
                to_json_column(&record.meta.correct_answers)?
            ],
        )?;

        let mut statement = connection.prepare(
            "INSERT INTO Variant(quizName, position, text, description) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (idx, variant) in record.variants.iter().enumerate() {
            let description = match &variant.description {
                Some(description) => Some(to_json_column(description)?),
                None => None,
            };
            statement.execute(params![
                record.name,
                idx as i64,
                to_json_column(&variant.text)?,
                description
            ])?;
        }
        debug!(
            "[DB] Created new Quiz '{}' at {} in Lesson '{}'",
            record.name, position, lesson_slug
        );
        Ok(position)
    }

    pub fn exists(connection: &Connection, name: &str) -> Result<bool> {
        let found: Option<i64> = connection
            .query_row("SELECT 1 FROM Quiz WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn variants(connection: &Connection, name: &str) -> Result<Vec<VariantRecord>> {
        let mut statement = connection.prepare(
            "SELECT text, description FROM Variant WHERE quizName = ?1 ORDER BY position",
        )?;
        let rows = statement.query_map(params![name], |row| {
            let description: Option<String> = row.get(1)?;
            let description = match description {
                Some(raw) => Some(serde_json::from_str(&raw).map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(err))
                })?),
                None => None,
            };
            Ok(VariantRecord {
                text: from_json_column(row, 0)?,
                description,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn from_row(row: &Row) -> rusqlite::Result<StoredQuiz> {
        let correct_answers: BTreeSet<usize> = from_json_column(row, 4)?;
        Ok(StoredQuiz {
            lesson_slug: row.get(1)?,
            position: row.get(2)?,
            record: QuizRecord {
                name: row.get(0)?,
                question: from_json_column(row, 3)?,
                variants: Vec::new(),
                meta: QuizMeta { correct_answers },
            },
        })
    }

    fn with_variants(connection: &Connection, mut quiz: StoredQuiz) -> Result<StoredQuiz> {
        quiz.record.variants = Self::variants(connection, &quiz.record.name)?;
        Ok(quiz)
    }

    pub fn get_by_name(connection: &Connection, name: &str) -> Result<StoredQuiz> {
        let mut statement = connection.prepare(
            "SELECT name, lessonSlug, position, question, correctAnswers \
            FROM Quiz WHERE name = ?1 LIMIT 1",
        )?;
        match statement.query_row(params![name], Self::from_row).optional()? {
            Some(quiz) => Self::with_variants(connection, quiz),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    pub fn get_in_lesson(connection: &Connection, lesson_slug: &str) -> Result<Vec<StoredQuiz>> {
        let mut statement = connection.prepare(
            "SELECT name, lessonSlug, position, question, correctAnswers \
            FROM Quiz WHERE lessonSlug = ?1 ORDER BY position",
        )?;
        let quizzes = statement
            .query_map(params![lesson_slug], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        quizzes
            .into_iter()
            .map(|quiz| Self::with_variants(connection, quiz))
            .collect()
    }
}

/// Copies a content pack into the database in one transaction. Lessons are
/// created on first sight; quizzes that are malformed or whose name is
/// already stored are skipped and reported.
pub fn import_pack(connection: &Connection, pack: &ContentPack) -> Result<ImportReport> {
    let now = Instant::now();
    let tx = connection.unchecked_transaction()?;
    let mut report = ImportReport::default();

    for lesson in &pack.lessons {
        if LessonRow::get_one(&tx, &lesson.slug)?.is_none() {
            LessonRow::new(&tx, &lesson.slug, &lesson.title)?;
            report.lessons_added += 1;
        }
        for record in &lesson.quizzes {
            if let Err(violation) = record.validate() {
                warn!("[Import] Skipping quiz '{}': {}", record.name, violation);
                report.skipped.push(Error::SchemaViolation {
                    name: record.name.clone(),
                    violation,
                });
                continue;
            }
            if StoredQuiz::exists(&tx, &record.name)? {
                warn!("[Import] Skipping quiz '{}': name already stored", record.name);
                report
                    .skipped
                    .push(Error::DuplicateName(record.name.clone()));
                continue;
            }
            StoredQuiz::add(&tx, &lesson.slug, record)?;
            report.quizzes_added += 1;
        }
    }

    tx.commit()?;
    info!(
        "[Import] Added {} lessons and {} quizzes, skipped {} in {} ms.",
        report.lessons_added,
        report.quizzes_added,
        report.skipped.len(),
        now.elapsed().as_millis()
    );
    Ok(report)
}

pub fn export_pack(connection: &Connection) -> Result<ContentPack> {
    let mut lessons = Vec::new();
    for row in LessonRow::get_all(connection)? {
        let quizzes = StoredQuiz::get_in_lesson(connection, &row.slug)?
            .into_iter()
            .map(|quiz| quiz.record)
            .collect();
        lessons.push(Lesson {
            slug: row.slug,
            title: row.title,
            quizzes,
        });
    }
    Ok(ContentPack { lessons })
}

/// Builds the registry from every stored quiz, lesson by lesson.
pub fn load_registry(connection: &Connection) -> Result<(Registry, Vec<Error>)> {
    let now = Instant::now();
    let mut registry = Registry::new();
    let mut errors = Vec::new();
    for lesson in LessonRow::get_all(connection)? {
        let records = StoredQuiz::get_in_lesson(connection, &lesson.slug)?
            .into_iter()
            .map(|quiz| quiz.record);
        errors.extend(registry.define_all(records));
    }
    debug!(
        "[DB] Loaded {} quizzes in {} ms.",
        registry.len(),
        now.elapsed().as_millis()
    );
    Ok((registry, errors))
}

pub fn create_or_open(src: &Path) -> Result<Connection> {
    if src.exists() {
        info!("[DB] Opening existing Database");
        open_db(src)
    } else {
        info!("[DB] Creating new Database");
        create_db(src)
    }
}

/// Builds the schema in memory, then backs it up to `dest` and reopens the
/// file so later writes land on disk.
pub fn create_db(dest: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = Connection::open_in_memory()?;
    init_db(&db)?;
    match db.backup(DatabaseName::Main, dest, None) {
        Ok(_) => {
            close_db(db)?;
            debug!(
                "[DB] Creating and Saving took {} ms.",
                now.elapsed().as_millis()
            );
            open_db(dest)
        }
        Err(err) => {
            warn!("[DB] Failed to create database file: {}", err);
            close_db(db)?;
            Err(err.into())
        }
    }
}

pub fn open_db(src: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = Connection::open(src)?;
    db.execute_batch("PRAGMA foreign_keys = ON")?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

pub fn close_db(connection: Connection) -> Result<()> {
    info!("[DB] Closing Database");
    let mut connection = connection;
    let mut attempt = 1;
    loop {
        match connection.close() {
            Ok(()) => return Ok(()),
            Err((conn, err)) if attempt < CLOSE_ATTEMPTS => {
                error!(
                    "[DB] Cannot close connection ({}). Retrying {}/{}...",
                    err,
                    attempt,
                    CLOSE_ATTEMPTS - 1
                );
                connection = conn;
                attempt += 1;
            }
            Err((_, err)) => {
                error!("[DB] Cannot close connection! Giving up.");
                return Err(err.into());
            }
        }
    }
}

pub fn init_db(conn: &Connection) -> Result<()> {
    info!("[DB INIT] Creating tables");
    conn.execute(
        "CREATE TABLE Lesson (
              slug TEXT NOT NULL PRIMARY KEY,
              title TEXT NOT NULL
            )",
        (),
    )?;
    info!("[DB INIT] Created table Lesson");
    conn.execute(
        "CREATE TABLE Quiz (
              name TEXT NOT NULL PRIMARY KEY,
              lessonSlug TEXT NOT NULL,
              position INTEGER NOT NULL,
              question TEXT NOT NULL,
              correctAnswers TEXT NOT NULL,
              FOREIGN KEY (lessonSlug) REFERENCES Lesson(slug) ON DELETE CASCADE ON UPDATE CASCADE
            )",
        (),
    )?;
    info!("[DB INIT] Created table Quiz");
    conn.execute(
        "CREATE TABLE Variant (
              quizName TEXT NOT NULL,
              position INTEGER NOT NULL,
              text TEXT NOT NULL,
              description TEXT,
              PRIMARY KEY (quizName, position),
              FOREIGN KEY (quizName) REFERENCES Quiz(name) ON DELETE CASCADE ON UPDATE CASCADE
            )",
        (),
    )?;
    info!("[DB INIT] Created table Variant");
    conn.execute("CREATE INDEX Quiz_lessonSlug_idx ON Quiz(lessonSlug)", ())?;
    info!("[DB INIT] Created index Quiz_lessonSlug_idx");
    info!("[DB INIT] Database Creation Successful!");

    Ok(())
}
