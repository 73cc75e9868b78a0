//! Storage layer for carpool-auth.
//!
//! This module provides `SQLite`-based persistent storage for user accounts,
//! one row per account in the `users` table.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::account::User;
use crate::error::{Error, Result};
use crate::repository::UserRepository;

use schema::USER_COLUMNS;

/// Storage format for `birth_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// `SQLite`-backed account storage.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summarize the stored accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the size of a
    /// file-backed database cannot be read.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_users, active_users, staff_users): (i64, i64, i64) = self.conn.query_row(
            r"
            SELECT COUNT(*),
                   COALESCE(SUM(is_active), 0),
                   COALESCE(SUM(is_staff), 0)
            FROM users
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT date_joined FROM users ORDER BY date_joined DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let newest_join = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path)?.len()
        };

        Ok(StorageStats {
            total_users: to_count(total_users)?,
            active_users: to_count(active_users)?,
            staff_users: to_count(staff_users)?,
            schema_version: migrations::schema_version(&self.conn)?,
            newest_join,
            db_size_bytes,
        })
    }

    fn query_users<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, UserRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    fn query_user<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<User>> {
        self.conn
            .query_row(sql, params, UserRow::from_row)
            .optional()?
            .map(UserRow::into_user)
            .transpose()
    }
}

impl UserRepository for Storage {
    fn insert(&self, user: &User) -> Result<i64> {
        let result = self.conn.execute(
            r"
            INSERT INTO users (
                email, username, first_name, last_name, birth_date, about_me,
                document_number, password, is_active, is_staff, is_superuser,
                date_joined, last_login
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
            params![
                user.email,
                user.username,
                user.first_name,
                user.last_name,
                user.birth_date.format(DATE_FORMAT).to_string(),
                user.about_me,
                user.document_number,
                user.password,
                user.is_active,
                user.is_staff,
                user.is_superuser,
                user.date_joined.to_rfc3339(),
                user.last_login.map(|t| t.to_rfc3339()),
            ],
        );
        map_unique_violation(result, &user.email)?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted user {} with id {}", user.email, id);
        Ok(id)
    }

    fn update(&self, user: &User) -> Result<()> {
        let Some(id) = user.id else {
            return Err(Error::user_not_found(&user.email));
        };

        let result = self.conn.execute(
            r"
            UPDATE users SET
                email = ?2, username = ?3, first_name = ?4, last_name = ?5,
                birth_date = ?6, about_me = ?7, document_number = ?8, password = ?9,
                is_active = ?10, is_staff = ?11, is_superuser = ?12,
                date_joined = ?13, last_login = ?14
            WHERE id = ?1
            ",
            params![
                id,
                user.email,
                user.username,
                user.first_name,
                user.last_name,
                user.birth_date.format(DATE_FORMAT).to_string(),
                user.about_me,
                user.document_number,
                user.password,
                user.is_active,
                user.is_staff,
                user.is_superuser,
                user.date_joined.to_rfc3339(),
                user.last_login.map(|t| t.to_rfc3339()),
            ],
        );

        if map_unique_violation(result, &user.email)? == 0 {
            return Err(Error::user_not_found(id.to_string()));
        }
        debug!("Updated user {}", id);
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<User>> {
        self.query_user(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
        )
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            [email],
        )
    }

    fn list(&self, include_inactive: bool, limit: usize) -> Result<Vec<User>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_users(
            &format!(
                "SELECT {USER_COLUMNS} FROM users WHERE (?1 OR is_active = 1) ORDER BY id LIMIT ?2"
            ),
            params![include_inactive, limit_i64],
        )
    }

    fn count(&self, include_inactive: bool) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE (?1 OR is_active = 1)",
            [include_inactive],
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn set_active(&self, email: &str, active: bool) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE users SET is_active = ?2 WHERE email = ?1",
            params![email, active],
        )?;
        Ok(affected > 0)
    }
}

/// Turn a unique-constraint failure on `users.email` into
/// [`Error::DuplicateEmail`].
fn map_unique_violation(
    result: std::result::Result<usize, rusqlite::Error>,
    email: &str,
) -> Result<usize> {
    match result {
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(Error::duplicate_email(email))
        }
        other => Ok(other?),
    }
}

fn to_count(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::internal(format!("negative count: {value}")))
}

/// A `users` row as stored, before dates are parsed.
struct UserRow {
    id: i64,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    birth_date: String,
    about_me: String,
    document_number: String,
    password: Option<String>,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: String,
    last_login: Option<String>,
}

impl UserRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            birth_date: row.get(5)?,
            about_me: row.get(6)?,
            document_number: row.get(7)?,
            password: row.get(8)?,
            is_active: row.get(9)?,
            is_staff: row.get(10)?,
            is_superuser: row.get(11)?,
            date_joined: row.get(12)?,
            last_login: row.get(13)?,
        })
    }

    fn into_user(self) -> Result<User> {
        let id = self.id;
        let corrupt = |field: &str, value: &str| Error::CorruptRecord {
            id,
            message: format!("unparseable {field}: {value}"),
        };

        let birth_date = NaiveDate::parse_from_str(&self.birth_date, DATE_FORMAT)
            .map_err(|_| corrupt("birth_date", &self.birth_date))?;
        let date_joined = parse_timestamp(&self.date_joined)
            .ok_or_else(|| corrupt("date_joined", &self.date_joined))?;
        let last_login = match &self.last_login {
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| corrupt("last_login", raw))?),
            None => None,
        };

        Ok(User {
            id: Some(id),
            email: self.email,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date,
            about_me: self.about_me,
            document_number: self.document_number,
            password: self.password,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            date_joined,
            last_login,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Statistics about the stored accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of accounts, active or not.
    pub total_users: usize,
    /// Accounts with the active flag set.
    pub active_users: usize,
    /// Accounts with the staff flag set.
    pub staff_users: usize,
    /// Schema version recorded in the database.
    pub schema_version: i32,
    /// When the most recent account was created.
    pub newest_join: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
