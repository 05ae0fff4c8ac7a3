//! # idgate
//!
//! `idgate` registers accounts and issues the bearer tokens other services
//! trust to identify them.
//!
//! ## Registration
//!
//! A new account needs a name, a syntactically valid email and a password of
//! at least eight characters. Passwords are stored as bcrypt digests only.
//! Emails are unique: the `users` table carries a unique index, and a
//! registration that loses a race against another one with the same email is
//! answered exactly like a plain duplicate (`409`).
//!
//! ## Authentication
//!
//! A login looks the account up by exact email, verifies the password against
//! the stored digest and answers with a fresh token. Whether an unknown email
//! is reported as `404 User not found` or folded into `401 Invalid credentials`
//! is a deployment choice (`--conceal-unknown-accounts`).
//!
//! ## Tokens
//!
//! Access tokens are HS256 JWTs carrying the account id as `sub` and an `exp`
//! seven days after issuance by default. Nothing is stored per token; any
//! service holding the signing key can verify them.

pub mod api;
pub mod cli;
pub mod credentials;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
