//! `SQLite` schema definitions for carpool-auth.

/// SQL statement to create the users table.
///
/// `email` carries the only uniqueness constraint; `username` is derived
/// and may repeat.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    about_me TEXT NOT NULL DEFAULT '',
    document_number TEXT NOT NULL,
    password TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_staff INTEGER NOT NULL DEFAULT 0,
    is_superuser INTEGER NOT NULL DEFAULT 0,
    date_joined TEXT NOT NULL,
    last_login TEXT
)
";

/// SQL statement to create an index on `is_active` for listing live accounts.
pub const CREATE_ACTIVE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_users_active ON users(is_active)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Column list shared by every `SELECT` over `users`, in row-decoding order.
pub const USER_COLUMNS: &str = "id, email, username, first_name, last_name, birth_date, \
     about_me, document_number, password, is_active, is_staff, is_superuser, \
     date_joined, last_login";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_ACTIVE_INDEX,
    CREATE_METADATA_TABLE,
];
