//! Account persistence.
//!
//! [`UserRepository`] is the seam between the account manager and whatever
//! stores rows. The SQLite-backed [`crate::storage::Storage`] is the
//! production backend; [`MemoryStore`] keeps accounts in a map.
//!
//! There is no delete: accounts are retained and deactivated instead.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::account::User;
use crate::error::{Error, Result};

/// CRUD operations over stored accounts.
///
/// Implementations must enforce email uniqueness, reporting a collision as
/// [`Error::DuplicateEmail`]. Emails are compared as stored, so callers pass
/// normalized addresses.
pub trait UserRepository {
    /// Store a new account and return its assigned id.
    ///
    /// Any `id` already on `user` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEmail`] if the email is taken, or a backend
    /// error.
    fn insert(&self, user: &User) -> Result<i64>;

    /// Overwrite the stored account with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if `user.id` is unset or unknown, and
    /// [`Error::DuplicateEmail`] if the new email belongs to another account.
    fn update(&self, user: &User) -> Result<()>;

    /// Fetch an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, id: i64) -> Result<Option<User>>;

    /// Fetch an account by its email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List accounts in id order, skipping inactive ones unless asked.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list(&self, include_inactive: bool, limit: usize) -> Result<Vec<User>>;

    /// Count accounts, skipping inactive ones unless asked.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn count(&self, include_inactive: bool) -> Result<usize>;

    /// Set the active flag of the account with this email.
    ///
    /// Returns `false` if no such account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn set_active(&self, email: &str, active: bool) -> Result<bool>;
}

/// Accounts held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl MemoryInner {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|(id, u)| u.email == email && Some(*id) != except)
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryStore {
    fn insert(&self, user: &User) -> Result<i64> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.email_taken(&user.email, None) {
            return Err(Error::duplicate_email(&user.email));
        }

        inner.last_id += 1;
        let id = inner.last_id;
        let mut stored = user.clone();
        stored.id = Some(id);
        inner.users.insert(id, stored);
        Ok(id)
    }

    fn update(&self, user: &User) -> Result<()> {
        let Some(id) = user.id else {
            return Err(Error::user_not_found(&user.email));
        };

        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !inner.users.contains_key(&id) {
            return Err(Error::user_not_found(id.to_string()));
        }
        if inner.email_taken(&user.email, Some(id)) {
            return Err(Error::duplicate_email(&user.email));
        }
        inner.users.insert(id, user.clone());
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.users.get(&id).cloned())
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    fn list(&self, include_inactive: bool, limit: usize) -> Result<Vec<User>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .users
            .values()
            .filter(|u| include_inactive || u.is_active)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, include_inactive: bool) -> Result<usize> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .users
            .values()
            .filter(|u| include_inactive || u.is_active)
            .count())
    }

    fn set_active(&self, email: &str, active: bool) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match inner.users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
