//! SQLite single-table file format for address books.
//!
//! A file holds one table, `persons`, with seven `TEXT` columns and no key.
//! Row order is the order persons had in the book when it was saved.

use std::fmt::Display;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use address_book_core::{AddressBook, BookRepository, LoadError, PersistError, Person};
use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use tracing::{debug, warn};

pub const TABLE_NAME: &str = "persons";

/// Stored column names, in constructor argument order.
pub const STORED_COLUMNS: [&str; 7] = [
    "firstName",
    "lastName",
    "address",
    "city",
    "state",
    "zip",
    "phone",
];

const RECREATE_PERSONS_SQL: &str = r"
DROP TABLE IF EXISTS persons;
CREATE TABLE persons (
  firstName TEXT,
  lastName TEXT,
  address TEXT,
  city TEXT,
  state TEXT,
  zip TEXT,
  phone TEXT
);
";

const INSERT_PERSON_SQL: &str = r"
INSERT INTO persons(firstName, lastName, address, city, state, zip, phone)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

const SELECT_PERSONS_SQL: &str = r"
SELECT firstName, lastName, address, city, state, zip, phone
FROM persons
ORDER BY rowid
";

const TABLE_EXISTS_SQL: &str = r"
SELECT EXISTS(
  SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE
)
";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub table: String,
    pub persons: usize,
    pub quick_check_ok: bool,
    pub quick_check_message: String,
}

/// Reads and writes address books as standalone SQLite files.
///
/// Every call opens its own connection and drops it before returning, so no
/// handle outlives a single load or save.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBookFile;

impl SqliteBookFile {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Read every stored person without touching any book.
    ///
    /// # Errors
    /// Returns [`LoadError::NotFound`] when `source` is missing, not a regular file,
    /// or unreadable, and [`LoadError::Format`] for anything that is not a valid
    /// address book file, including rows that fail person validation.
    pub fn read_persons(&self, source: &Path) -> Result<Vec<Person>, LoadError> {
        ensure_readable(source)?;
        let conn = open_read_only(source)?;
        verify_schema(&conn, source)?;

        let persons = select_persons(&conn, source)?;
        debug!(path = %source.display(), persons = persons.len(), "read address book file");
        Ok(persons)
    }

    /// Validate `source` and report its size plus a `PRAGMA quick_check` result.
    ///
    /// # Errors
    /// Same as [`Self::read_persons`].
    pub fn inspect(&self, source: &Path) -> Result<FileSummary, LoadError> {
        let persons = self.read_persons(source)?;
        let conn = open_read_only(source)?;
        let quick_check_message: String = conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(|err| format_error(source, err))?;

        Ok(FileSummary {
            path: source.to_path_buf(),
            table: TABLE_NAME.to_string(),
            persons: persons.len(),
            quick_check_ok: quick_check_message == "ok",
            quick_check_message,
        })
    }
}

impl BookRepository for SqliteBookFile {
    fn load(&self, book: &mut AddressBook, source: &Path) -> Result<(), LoadError> {
        let persons = self.read_persons(source)?;
        book.replace_all(persons);
        Ok(())
    }

    fn save(&self, book: &AddressBook, destination: &Path) -> Result<(), PersistError> {
        write_persons(destination, book).map_err(|err| {
            warn!(path = %destination.display(), error = %err, "failed to save address book");
            PersistError {
                path: destination.to_path_buf(),
                reason: err.to_string(),
            }
        })?;

        debug!(path = %destination.display(), persons = book.len(), "saved address book file");
        Ok(())
    }
}

fn open_read_only(source: &Path) -> Result<Connection, LoadError> {
    Connection::open_with_flags(
        source,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| format_error(source, err))
}

fn write_persons(destination: &Path, book: &AddressBook) -> rusqlite::Result<()> {
    let mut conn = Connection::open(destination)?;
    let tx = conn.transaction()?;
    tx.execute_batch(RECREATE_PERSONS_SQL)?;
    {
        let mut stmt = tx.prepare(INSERT_PERSON_SQL)?;
        for person in book.persons() {
            stmt.execute(params![
                person.first_name(),
                person.last_name(),
                person.address(),
                person.city(),
                person.state(),
                person.zip(),
                person.phone(),
            ])?;
        }
    }
    tx.commit()
}

fn ensure_readable(source: &Path) -> Result<(), LoadError> {
    let not_found = || LoadError::NotFound {
        path: source.to_path_buf(),
    };

    let metadata = fs::metadata(source).map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    File::open(source).map_err(|_| not_found())?;
    Ok(())
}

fn format_error(source: &Path, reason: impl Display) -> LoadError {
    let reason = reason.to_string();
    warn!(path = %source.display(), %reason, "rejected address book file");
    LoadError::Format {
        path: source.to_path_buf(),
        reason,
    }
}

/// Table and column names compare case-insensitively, as SQLite resolves them.
fn verify_schema(conn: &Connection, source: &Path) -> Result<(), LoadError> {
    let sql_error = |err: rusqlite::Error| format_error(source, err);
    if !table_exists(conn, TABLE_NAME).map_err(sql_error)? {
        return Err(format_error(source, format!("missing table {TABLE_NAME}")));
    }

    let columns = table_columns(conn, TABLE_NAME).map_err(sql_error)?;
    for expected in STORED_COLUMNS {
        if !columns.iter().any(|name| name.eq_ignore_ascii_case(expected)) {
            let reason = format!("missing column {TABLE_NAME}.{expected}");
            return Err(format_error(source, reason));
        }
    }

    Ok(())
}

fn select_persons(conn: &Connection, source: &Path) -> Result<Vec<Person>, LoadError> {
    let sql_error = |err: rusqlite::Error| format_error(source, err);
    let mut stmt = conn.prepare(SELECT_PERSONS_SQL).map_err(sql_error)?;
    let mut rows = stmt.query([]).map_err(sql_error)?;
    let mut persons = Vec::new();

    while let Some(row) = rows.next().map_err(sql_error)? {
        let row_number = persons.len() + 1;
        let mut values: [String; 7] = Default::default();
        for (column, value) in values.iter_mut().enumerate() {
            *value = row
                .get::<_, String>(column)
                .map_err(|err| row_error(source, row_number, err))?;
        }

        let [first_name, last_name, address, city, state, zip, phone] = values;
        let person = Person::new(first_name, last_name, address, city, state, zip, phone)
            .map_err(|err| row_error(source, row_number, err))?;
        persons.push(person);
    }

    Ok(persons)
}

fn row_error(source: &Path, row_number: usize, err: impl Display) -> LoadError {
    format_error(source, format!("row {row_number}: {err}"))
}

fn table_exists(conn: &Connection, table_name: &str) -> rusqlite::Result<bool> {
    let exists = conn.query_row(
        TABLE_EXISTS_SQL,
        params![table_name],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();

    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }

    Ok(columns)
}
