//! Email canonicalization used as the account key.

use regex::Regex;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Domains whose mailboxes ignore dots and `+tag` suffixes in the local part.
const GMAIL_DOMAINS: [&str; 2] = ["gmail.com", "googlemail.com"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is empty")]
    Empty,
    #[error("email is too long")]
    TooLong,
    #[error("email is not a valid address")]
    Invalid,
}

/// Basic shape check: `local@domain.tld` with no whitespace.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Canonicalize `email` for storage and lookup.
///
/// Trims whitespace and lowercases the address. Gmail addresses are further
/// reduced to their delivery mailbox. The result is stable under repeated
/// application.
///
/// # Errors
/// Returns [`EmailError`] when the input is not a plausible address.
pub fn normalize(email: &str) -> Result<String, EmailError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(EmailError::Empty);
    }
    if !valid_email(email) {
        return Err(EmailError::Invalid);
    }

    let (local, domain) = email.rsplit_once('@').ok_or(EmailError::Invalid)?;

    // Lowercasing can grow non-ASCII text, so limits apply to the result.
    let mut local = local.to_lowercase();
    let mut domain = domain.to_lowercase();

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(EmailError::Invalid);
    }

    if GMAIL_DOMAINS.contains(&domain.as_str()) {
        domain = GMAIL_DOMAINS[0].to_string();
        local = local.replace('.', "");
        if let Some((mailbox, _tag)) = local.split_once('+') {
            local = mailbox.to_string();
        }
        if local.is_empty() {
            return Err(EmailError::Invalid);
        }
    }

    if local.len() > MAX_LOCAL_PART_LENGTH {
        return Err(EmailError::Invalid);
    }

    let normalized = format!("{local}@{domain}");
    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(EmailError::TooLong);
    }

    Ok(normalized)
}
