//! The user account record.
//!
//! A [`User`] is a flat record: every field is declared here rather than
//! inherited from some base account type. The email address is the login
//! identifier; `username` is a display name derived from first and last name
//! each time the account is saved and is not unique.

pub mod email;
pub mod validation;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use email::{is_valid_email, normalize_email};
pub use validation::{validate_document_number, Validator};

/// A carpool user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier; `None` until the first save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Login identifier, unique across all accounts.
    pub email: String,

    /// Display name, rewritten to `"<first> <last>"` on every save.
    pub username: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Date of birth, used for the age rules.
    pub birth_date: NaiveDate,

    /// Free-text profile blurb. May be empty.
    #[serde(default)]
    pub about_me: String,

    /// Eight-digit national document number.
    pub document_number: String,

    /// Argon2 PHC string, or `None` when the account has no usable password.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,

    /// Inactive accounts are retained but cannot log in.
    pub is_active: bool,

    /// May access the administration tooling.
    pub is_staff: bool,

    /// Has every permission without explicit grants.
    pub is_superuser: bool,

    /// When the account was created.
    pub date_joined: DateTime<Utc>,

    /// Last successful authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// The fields a caller supplies to create an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Login email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Eight-digit national document number.
    pub document_number: String,
    /// Optional profile blurb.
    #[serde(default)]
    pub about_me: String,
}

impl NewUser {
    /// Collect the required fields for a new account.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
        document_number: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            document_number: document_number.into(),
            about_me: String::new(),
        }
    }

    /// Attach an "about me" text.
    #[must_use]
    pub fn with_about_me(mut self, about_me: impl Into<String>) -> Self {
        self.about_me = about_me.into();
        self
    }
}

impl User {
    /// Build an unsaved, active, non-staff account from creation fields.
    ///
    /// The email is normalized and the display name derived; the account
    /// starts without a usable password.
    #[must_use]
    pub fn new(new_user: NewUser) -> Self {
        let NewUser {
            email,
            first_name,
            last_name,
            birth_date,
            document_number,
            about_me,
        } = new_user;

        let mut user = Self {
            id: None,
            email: normalize_email(&email),
            username: String::new(),
            first_name,
            last_name,
            birth_date,
            about_me,
            document_number,
            password: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
        };
        user.sync_username();
        user
    }

    /// The display name for this account: first and last name joined by a
    /// single space.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Overwrite `username` with the current display name.
    pub fn sync_username(&mut self) {
        self.username = self.display_name();
    }

    /// Age in whole years on the given date.
    ///
    /// Negative when the birth date lies after `today`.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.birth_date, today)
    }

    /// Whether the account has a password that can ever verify.
    #[must_use]
    pub fn has_usable_password(&self) -> bool {
        self.password.is_some()
    }

    /// Whether the account has been persisted.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.email)
    }
}

/// Whole years elapsed between `birth_date` and `today`.
///
/// One year is subtracted while the birthday has not yet come around in
/// `today`'s year, so a 29 February birthday is reached on 1 March in
/// common years.
#[must_use]
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}
