//! `carpool-auth` - user accounts for a carpooling service
//!
//! This library holds the account model riders and drivers log in with:
//! email identity, profile fields, eligibility rules (an eight-digit
//! national document number and an age window), password hashing, and
//! SQLite persistence behind a [`UserRepository`] seam.
//!
//! All account lifecycle operations go through [`UserManager`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod account;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod password;
pub mod repository;
pub mod storage;

pub use account::{NewUser, User, Validator};
pub use config::{AccountsConfig, Config};
pub use error::{Error, Result, ValidationError};
pub use logging::init_logging;
pub use manager::UserManager;
pub use password::PasswordHasher;
pub use repository::{MemoryStore, UserRepository};
pub use storage::{Storage, StorageStats};
