use regex::Regex;
use std::sync::OnceLock;

/// Shortest secret accepted at registration, counted in UTF-16 code units
/// (the length a browser reports for the same string).
pub const MIN_SECRET_LENGTH: usize = 8;

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Basic email format check: `local@domain.tld`, no whitespace, a single `@`.
pub fn valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

pub fn strong_secret(secret: &str) -> bool {
    secret.encode_utf16().count() >= MIN_SECRET_LENGTH
}
