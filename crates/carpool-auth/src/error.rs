//! Error types for carpool-auth.
//!
//! [`ValidationError`] is the domain error raised when an account fails its
//! pre-save checks. [`Error`] wraps it together with the storage, config and
//! hashing failures the rest of the crate can produce.

use std::path::PathBuf;
use thiserror::Error;

/// A data-quality rule violated by an account about to be saved.
///
/// The display text is meant to be shown to the end user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The email address is not syntactically valid.
    #[error("Enter a valid email address: '{email}'.")]
    InvalidEmail {
        /// The rejected address.
        email: String,
    },

    /// A required field was left blank.
    #[error("The {field} field is required.")]
    MissingField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// A bounded text field exceeds its maximum length.
    #[error("The {field} field must be at most {max} characters long (got {actual}).")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum number of characters allowed.
        max: usize,
        /// Number of characters supplied.
        actual: usize,
    },

    /// The document number is not exactly eight characters.
    #[error("Document number must be 8 characters long (got {actual}).")]
    DocumentNumberLength {
        /// Number of characters supplied.
        actual: usize,
    },

    /// The document number contains a non-digit character.
    #[error("Document number must be a number.")]
    DocumentNumberNotNumeric,

    /// The document number is zero.
    #[error("Document number must be a positive number.")]
    DocumentNumberNotPositive,

    /// The user is younger than the minimum age.
    #[error("User must be at least {min} years old (is {age}).")]
    TooYoung {
        /// Computed age in whole years; negative for future birth dates.
        age: i32,
        /// Configured minimum age.
        min: u16,
    },

    /// The user is older than the maximum age.
    #[error("User birth date is invalid: age {age} exceeds the maximum of {max} years.")]
    TooOld {
        /// Computed age in whole years.
        age: i32,
        /// Configured maximum age.
        max: u16,
    },
}

/// The main error type for carpool-auth operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Account Errors ===
    /// The account failed validation and was not saved.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Another account already uses this email address.
    #[error("a user with email '{email}' already exists")]
    DuplicateEmail {
        /// The conflicting email.
        email: String,
    },

    /// No account matches the lookup key.
    #[error("user not found: {key}")]
    UserNotFound {
        /// The email or id that was looked up.
        key: String,
    },

    /// Hashing or parsing a password hash failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored row could not be decoded.
    #[error("corrupt user record {id}: {message}")]
    CorruptRecord {
        /// Row id of the record.
        id: i64,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for carpool-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a user-not-found error for the given lookup key.
    #[must_use]
    pub fn user_not_found(key: impl Into<String>) -> Self {
        Self::UserNotFound { key: key.into() }
    }

    /// Create a duplicate email error.
    #[must_use]
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// The validation failure behind this error, if any.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this error is a rejected save due to a data-quality rule.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error indicates a missing account.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound { .. })
    }
}
