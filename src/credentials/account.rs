use crate::credentials::hasher::HashedSecret;
use serde::Serialize;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Store-assigned account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered identity as held by the store.
///
/// Deliberately not `Serialize`: the digest must never leave the process.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub secret_hash: HashedSecret,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_id_round_trips_through_text() {
        let id = AccountId::new_random();
        let parsed: AccountId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<AccountId>().is_err());
    }

    #[test]
    fn account_debug_hides_digest() {
        let account = Account {
            id: AccountId::new_random(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            secret_hash: HashedSecret::from_stored("$2b$04$abcdefghijklmnopqrstuv".to_string()),
        };
        let debug = format!("{account:?}");
        assert!(debug.contains("ann@x.com"));
        assert!(!debug.contains("$2b$"));
    }
}
