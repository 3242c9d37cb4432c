//! Username rules used during onboarding.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Lowercase letter first, then letters, digits, `_` or `-`.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]{2,29}$").expect("valid regex"));

/// Names that collide with routes or imply platform authority.
const RESERVED: &[&str] = &[
    "admin",
    "administrator",
    "api",
    "collabbridge",
    "dashboard",
    "help",
    "login",
    "logout",
    "me",
    "messages",
    "notifications",
    "null",
    "register",
    "root",
    "search",
    "settings",
    "signup",
    "support",
    "system",
    "undefined",
];

/// Lowercase and validate a requested username.
pub fn normalize_username(raw: &str) -> Result<String, CoreError> {
    let username = raw.trim().to_lowercase();
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_RE.is_match(&username) {
        return Err(CoreError::Validation(
            "Username must start with a letter and contain only letters, numbers, '_' or '-'"
                .into(),
        ));
    }
    if is_reserved(&username) {
        return Err(CoreError::Validation(format!(
            "Username '{username}' is reserved"
        )));
    }
    Ok(username)
}

pub fn is_reserved(username: &str) -> bool {
    RESERVED.contains(&username)
}

/// Candidate usernames derived from a base (usually the display name or the
/// rejected request). Callers filter out the taken ones.
pub fn username_candidates(base: &str, count: usize) -> Vec<String> {
    let mut stem: String = base
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .skip_while(|c| !c.is_ascii_lowercase())
        .take(MAX_USERNAME_LENGTH - 4)
        .collect();
    if stem.chars().count() < MIN_USERNAME_LENGTH {
        stem = format!("{stem}user");
    }

    let mut out = Vec::with_capacity(count);
    if !is_reserved(&stem) {
        out.push(stem.clone());
    }
    let mut n = 1;
    while out.len() < count {
        out.push(format!("{stem}{n}"));
        n += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_usernames_are_lowercased() {
        assert_eq!(normalize_username(" Ada_Lovelace ").unwrap(), "ada_lovelace");
        assert_eq!(normalize_username("dj-k9").unwrap(), "dj-k9");
    }

    #[test]
    fn length_bounds() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username(&"a".repeat(31)).is_err());
        assert!(normalize_username(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn must_start_with_letter() {
        assert!(normalize_username("9lives").is_err());
        assert!(normalize_username("_hidden").is_err());
        assert!(normalize_username("has space").is_err());
    }

    #[test]
    fn reserved_names_are_rejected() {
        assert!(normalize_username("Admin").is_err());
    }

    #[test]
    fn candidates_are_valid_and_distinct() {
        let c = username_candidates("Ada Lovelace!", 3);
        assert_eq!(c, vec!["adalovelace", "adalovelace1", "adalovelace2"]);
        for name in &c {
            assert!(normalize_username(name).is_ok());
        }
    }

    #[test]
    fn short_or_reserved_base_is_padded() {
        assert_eq!(username_candidates("Al", 1), vec!["aluser"]);
        assert_eq!(username_candidates("admin", 1), vec!["admin1"]);
    }
}
