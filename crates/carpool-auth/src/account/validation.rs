//! Pre-save validation for user accounts.
//!
//! [`Validator::validate`] runs every rule against a record and stops at the
//! first failure. It never mutates the record.

use chrono::NaiveDate;

use crate::config::AccountsConfig;
use crate::error::ValidationError;

use super::email::is_valid_email;
use super::{age_on, User};

/// Required length of a document number, in characters.
pub const DOCUMENT_NUMBER_LENGTH: usize = 8;

/// Maximum length of the first and last name fields, in characters.
pub const NAME_MAX_LENGTH: usize = 150;

/// Check a document number: exactly eight characters, all ASCII digits, and
/// not zero.
///
/// The checks run in that order, so a short value reports its length even
/// if it also contains letters.
///
/// # Errors
///
/// Returns the first rule the value violates.
pub fn validate_document_number(document_number: &str) -> Result<(), ValidationError> {
    let actual = document_number.chars().count();
    if actual != DOCUMENT_NUMBER_LENGTH {
        return Err(ValidationError::DocumentNumberLength { actual });
    }
    if !document_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::DocumentNumberNotNumeric);
    }
    if document_number.bytes().all(|b| b == b'0') {
        return Err(ValidationError::DocumentNumberNotPositive);
    }
    Ok(())
}

/// Applies the account rules configured under `[accounts]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    rules: AccountsConfig,
}

impl Validator {
    /// Create a validator enforcing the given rules.
    #[must_use]
    pub fn new(rules: AccountsConfig) -> Self {
        Self { rules }
    }

    /// The rules this validator enforces.
    #[must_use]
    pub fn rules(&self) -> &AccountsConfig {
        &self.rules
    }

    /// Validate a record as of `today`.
    ///
    /// Profile fields are checked first, then the document number, then the
    /// age bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self, user: &User, today: NaiveDate) -> Result<(), ValidationError> {
        self.validate_profile(user)?;
        validate_document_number(&user.document_number)?;
        self.validate_age(user.birth_date, today)
    }

    /// Check that someone born on `birth_date` is within the age bounds on
    /// `today`. Both bounds are inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TooYoung`] or [`ValidationError::TooOld`].
    pub fn validate_age(&self, birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
        let age = age_on(birth_date, today);
        if age < i32::from(self.rules.min_age) {
            return Err(ValidationError::TooYoung {
                age,
                min: self.rules.min_age,
            });
        }
        if age > i32::from(self.rules.max_age) {
            return Err(ValidationError::TooOld {
                age,
                max: self.rules.max_age,
            });
        }
        Ok(())
    }

    fn validate_profile(&self, user: &User) -> Result<(), ValidationError> {
        if user.email.is_empty() {
            return Err(ValidationError::MissingField { field: "email" });
        }
        if !is_valid_email(&user.email) {
            return Err(ValidationError::InvalidEmail {
                email: user.email.clone(),
            });
        }

        required_text("first_name", &user.first_name, NAME_MAX_LENGTH)?;
        required_text("last_name", &user.last_name, NAME_MAX_LENGTH)?;

        let about_me_len = user.about_me.chars().count();
        if about_me_len > self.rules.about_me_max_length {
            return Err(ValidationError::FieldTooLong {
                field: "about_me",
                max: self.rules.about_me_max_length,
                actual: about_me_len,
            });
        }

        Ok(())
    }
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewUser;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 10, 19)
    }

    fn valid_user() -> User {
        User::new(NewUser::new(
            "ana@example.com",
            "Ana",
            "Gomez",
            date(1996, 3, 2),
            "12345678",
        ))
    }

    #[test]
    fn test_valid_user_passes() {
        let validator = Validator::default();
        assert_eq!(validator.validate(&valid_user(), today()), Ok(()));
    }

    #[test]
    fn test_document_number_length() {
        assert_eq!(
            validate_document_number("1234567"),
            Err(ValidationError::DocumentNumberLength { actual: 7 })
        );
        assert_eq!(
            validate_document_number("123456789"),
            Err(ValidationError::DocumentNumberLength { actual: 9 })
        );
        assert_eq!(
            validate_document_number(""),
            Err(ValidationError::DocumentNumberLength { actual: 0 })
        );
    }

    #[test]
    fn test_document_number_length_reported_before_digits() {
        assert_eq!(
            validate_document_number("12ab"),
            Err(ValidationError::DocumentNumberLength { actual: 4 })
        );
    }

    #[test]
    fn test_document_number_non_digit() {
        for value in ["1234567a", "-1234567", "1234 678", "+1234567", "12.45678"] {
            assert_eq!(
                validate_document_number(value),
                Err(ValidationError::DocumentNumberNotNumeric),
                "value: {value}"
            );
        }
    }

    #[test]
    fn test_document_number_non_ascii_digits() {
        // Eight Arabic-Indic digits: right length, but not ASCII.
        let value = "١٢٣٤٥٦٧٨";
        assert_eq!(value.chars().count(), 8);
        assert_eq!(
            validate_document_number(value),
            Err(ValidationError::DocumentNumberNotNumeric)
        );
    }

    #[test]
    fn test_document_number_zero() {
        assert_eq!(
            validate_document_number("00000000"),
            Err(ValidationError::DocumentNumberNotPositive)
        );
    }

    #[test]
    fn test_document_number_leading_zeros_allowed() {
        assert_eq!(validate_document_number("00000001"), Ok(()));
        assert_eq!(validate_document_number("01234567"), Ok(()));
    }

    #[test]
    fn test_too_young() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.birth_date = date(2011, 1, 1);

        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::TooYoung { age: 15, min: 18 })
        );
    }

    #[test]
    fn test_too_old() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.birth_date = date(1920, 1, 1);

        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::TooOld { age: 106, max: 100 })
        );
    }

    #[test]
    fn test_eighteenth_birthday_boundary() {
        let validator = Validator::default();
        let birth = date(2008, 10, 19);

        assert!(matches!(
            validator.validate_age(birth, date(2026, 10, 18)),
            Err(ValidationError::TooYoung { age: 17, .. })
        ));
        assert_eq!(validator.validate_age(birth, date(2026, 10, 19)), Ok(()));
    }

    #[test]
    fn test_year_only_arithmetic_would_be_wrong() {
        // Same calendar year difference of 18, birthday still ahead.
        let validator = Validator::default();
        assert!(validator
            .validate_age(date(2008, 12, 31), today())
            .is_err());
    }

    #[test]
    fn test_hundred_and_first_birthday_boundary() {
        let validator = Validator::default();
        let birth = date(1925, 10, 20);

        assert_eq!(validator.validate_age(birth, date(2026, 10, 19)), Ok(()));
        assert!(matches!(
            validator.validate_age(birth, date(2026, 10, 20)),
            Err(ValidationError::TooOld { age: 101, .. })
        ));
    }

    #[test]
    fn test_future_birth_date_is_too_young() {
        let validator = Validator::default();
        assert!(matches!(
            validator.validate_age(date(2027, 1, 1), today()),
            Err(ValidationError::TooYoung { age: -1, .. })
        ));
    }

    #[test]
    fn test_custom_age_bounds() {
        let validator = Validator::new(AccountsConfig {
            min_age: 21,
            max_age: 80,
            ..AccountsConfig::default()
        });

        assert!(matches!(
            validator.validate_age(date(2006, 1, 1), today()),
            Err(ValidationError::TooYoung { age: 20, min: 21 })
        ));
        assert!(matches!(
            validator.validate_age(date(1940, 1, 1), today()),
            Err(ValidationError::TooOld { age: 86, max: 80 })
        ));
    }

    #[test]
    fn test_document_checked_before_age() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.document_number = "1234567".to_string();
        user.birth_date = date(2015, 1, 1);

        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::DocumentNumberLength { actual: 7 })
        );
    }

    #[test]
    fn test_invalid_email() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.email = "not-an-email".to_string();

        assert!(matches!(
            validator.validate(&user, today()),
            Err(ValidationError::InvalidEmail { .. })
        ));
    }

    #[test]
    fn test_missing_email() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.email = String::new();

        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::MissingField { field: "email" })
        );
    }

    #[test]
    fn test_blank_names() {
        let validator = Validator::default();

        let mut user = valid_user();
        user.first_name = "   ".to_string();
        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::MissingField {
                field: "first_name"
            })
        );

        let mut user = valid_user();
        user.last_name = String::new();
        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::MissingField { field: "last_name" })
        );
    }

    #[test]
    fn test_name_too_long() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.first_name = "a".repeat(NAME_MAX_LENGTH + 1);

        assert_eq!(
            validator.validate(&user, today()),
            Err(ValidationError::FieldTooLong {
                field: "first_name",
                max: NAME_MAX_LENGTH,
                actual: NAME_MAX_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_about_me_bound_counts_characters() {
        let validator = Validator::default();
        let mut user = valid_user();

        user.about_me = "ñ".repeat(500);
        assert_eq!(validator.validate(&user, today()), Ok(()));

        user.about_me.push('x');
        assert!(matches!(
            validator.validate(&user, today()),
            Err(ValidationError::FieldTooLong {
                field: "about_me",
                max: 500,
                actual: 501,
            })
        ));
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let validator = Validator::default();
        let mut user = valid_user();
        user.first_name = "Maria".to_string();
        let before = user.clone();

        let _ = validator.validate(&user, today());
        assert_eq!(user, before);
        assert_eq!(user.username, "Ana Gomez");
    }
}
