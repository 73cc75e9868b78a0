//! Email address normalization and syntax checks.

use std::sync::OnceLock;

use regex::Regex;

/// Longest address accepted, matching the limits of common mail systems.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Dot-atom local part, then dot-separated hostname labels ending in a TLD.
const EMAIL_PATTERN: &str = r"(?i)^[-!#$%&'*+/=?^_`{}|~0-9a-z]+(\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*@([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant covered by tests.
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Trim surrounding whitespace and lowercase the domain part.
///
/// The local part is kept as typed; mail servers may treat it as case
/// sensitive. Input without an `@` is only trimmed.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Whether `email` is a syntactically valid address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX_LENGTH && email_regex().is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("Ana.Gomez@Example.COM"), "Ana.Gomez@example.com");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_email("  ana@example.com\n"), "ana@example.com");
    }

    #[test]
    fn test_normalize_without_at_sign() {
        assert_eq!(normalize_email(" NotAnEmail "), "NotAnEmail");
    }

    #[test]
    fn test_valid_addresses() {
        for email in [
            "ana@example.com",
            "ana.gomez+rides@mail.example.org",
            "x@sub-domain.example.co",
            "O'Brien@example.ie",
        ] {
            assert!(is_valid_email(email), "expected valid: {email}");
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for email in [
            "",
            "ana",
            "ana@",
            "@example.com",
            "ana@example",
            "ana..gomez@example.com",
            "ana@-example.com",
            "ana gomez@example.com",
            "ana@example.c",
        ] {
            assert!(!is_valid_email(email), "expected invalid: {email}");
        }
    }

    #[test]
    fn test_overlong_address_rejected() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&email));
    }
}
