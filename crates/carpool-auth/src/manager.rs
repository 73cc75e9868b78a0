//! Account lifecycle operations.
//!
//! [`UserManager`] owns a repository and applies the account rules around
//! every write: validation, then username derivation, then persistence.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::account::{normalize_email, NewUser, User, Validator};
use crate::config::AccountsConfig;
use crate::error::{Error, Result, ValidationError};
use crate::password::PasswordHasher;
use crate::repository::UserRepository;

/// Creates, looks up, saves and deactivates accounts.
#[derive(Debug)]
pub struct UserManager<R> {
    repo: R,
    validator: Validator,
    hasher: PasswordHasher,
}

impl<R: UserRepository> UserManager<R> {
    /// Create a manager over `repo` enforcing `rules`.
    #[must_use]
    pub fn new(repo: R, rules: AccountsConfig) -> Self {
        Self {
            repo,
            validator: Validator::new(rules),
            hasher: PasswordHasher::new(),
        }
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// The validator applied on save.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Create a regular account.
    ///
    /// Without a password the account gets an unusable one and can never
    /// authenticate by password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the fields break an account rule,
    /// [`Error::DuplicateEmail`] if the email is taken, or a storage error.
    pub fn create_user(&self, new_user: NewUser, password: Option<&str>) -> Result<User> {
        let mut user = User::new(new_user);
        self.set_password(&mut user, password)?;
        self.save(&mut user)?;

        info!("Created user {} (id {:?})", user.email, user.id);
        Ok(user)
    }

    /// Create an account with the staff and superuser flags set.
    ///
    /// # Errors
    ///
    /// As [`Self::create_user`]; an empty password is a validation failure.
    pub fn create_superuser(&self, new_user: NewUser, password: &str) -> Result<User> {
        if password.is_empty() {
            return Err(ValidationError::MissingField { field: "password" }.into());
        }

        let mut user = User::new(new_user);
        user.is_staff = true;
        user.is_superuser = true;
        self.set_password(&mut user, Some(password))?;
        self.save(&mut user)?;

        info!("Created superuser {} (id {:?})", user.email, user.id);
        Ok(user)
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn get(&self, id: i64) -> Result<Option<User>> {
        self.repo.get(id)
    }

    /// Look up an account by email, normalizing the address first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repo.get_by_email(&normalize_email(email))
    }

    /// Look up an account by email, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no account matches.
    pub fn require(&self, email: &str) -> Result<User> {
        self.get_by_email(email)?
            .ok_or_else(|| Error::user_not_found(normalize_email(email)))
    }

    /// Validate and persist an account as of today.
    ///
    /// See [`Self::save_as_of`].
    ///
    /// # Errors
    ///
    /// As [`Self::save_as_of`].
    pub fn save(&self, user: &mut User) -> Result<()> {
        self.save_as_of(user, Utc::now().date_naive())
    }

    /// Validate and persist an account, judging age on `today`.
    ///
    /// On success the stored email is normalized, `username` is set to
    /// `"<first> <last>"`, and a new account receives its id. On failure
    /// `user` is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a broken rule,
    /// [`Error::DuplicateEmail`] on an email collision,
    /// [`Error::UserNotFound`] when updating an id the repository does not
    /// know, or a storage error.
    pub fn save_as_of(&self, user: &mut User, today: NaiveDate) -> Result<()> {
        let mut candidate = user.clone();
        candidate.email = normalize_email(&candidate.email);

        if let Err(err) = self.validator.validate(&candidate, today) {
            debug!("Rejected save of {}: {}", candidate.email, err);
            return Err(err.into());
        }
        candidate.sync_username();

        match candidate.id {
            Some(id) => {
                self.repo.update(&candidate)?;
                debug!("Saved user {}", id);
            }
            None => {
                candidate.id = Some(self.repo.insert(&candidate)?);
            }
        }

        *user = candidate;
        Ok(())
    }

    /// Replace the password hash on `user`, or make it unusable with `None`.
    ///
    /// The change is not persisted until the account is saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PasswordHash`] if hashing fails.
    pub fn set_password(&self, user: &mut User, password: Option<&str>) -> Result<()> {
        user.password = password.map(|p| self.hasher.hash(p)).transpose()?;
        Ok(())
    }

    /// Check a plaintext password against the account's hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PasswordHash`] if the stored hash is malformed.
    pub fn check_password(&self, user: &User, password: &str) -> Result<bool> {
        self.hasher.verify(password, user.password.as_deref())
    }

    /// Log in with email and password.
    ///
    /// Returns the account, with `last_login` stamped, when it exists, is
    /// active, and the password verifies. Every other case is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails or the stored hash is
    /// malformed.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(mut user) = self.get_by_email(email)? else {
            debug!("Authentication failed: no user {}", normalize_email(email));
            return Ok(None);
        };

        if !user.is_active {
            warn!("Authentication refused for inactive user {}", user.email);
            return Ok(None);
        }
        if !self.check_password(&user, password)? {
            debug!("Authentication failed: bad password for {}", user.email);
            return Ok(None);
        }

        // A login stamp is not a profile edit, so it skips validation.
        user.last_login = Some(Utc::now());
        self.repo.update(&user)?;
        Ok(Some(user))
    }

    /// Mark an account inactive. The record is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no account matches.
    pub fn deactivate(&self, email: &str) -> Result<()> {
        self.set_active(email, false)
    }

    /// Mark a previously deactivated account active again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no account matches.
    pub fn activate(&self, email: &str) -> Result<()> {
        self.set_active(email, true)
    }

    fn set_active(&self, email: &str, active: bool) -> Result<()> {
        let email = normalize_email(email);
        if !self.repo.set_active(&email, active)? {
            return Err(Error::user_not_found(email));
        }
        info!(
            "{} user {}",
            if active { "Activated" } else { "Deactivated" },
            email
        );
        Ok(())
    }

    /// List accounts in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn list(&self, include_inactive: bool, limit: usize) -> Result<Vec<User>> {
        self.repo.list(include_inactive, limit)
    }

    /// Count accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn count(&self, include_inactive: bool) -> Result<usize> {
        self.repo.count(include_inactive)
    }
}
