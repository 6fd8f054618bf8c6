#![forbid(unsafe_code)]

//! The user database.
//!
//! The on-disk shape has two tables, users and accounts, joined on the user
//! id. Account credit may be stored as a number or as a numeric string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::session::SessionError;

/// Numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

/// One row of the users table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// One row of the accounts table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountRecord {
    pub user_id: UserId,
    #[serde(rename = "creditSEK", deserialize_with = "number_or_string")]
    pub credit: f64,
}

/// The user database as loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserDatabase {
    pub users: Vec<UserRecord>,
    #[serde(rename = "account")]
    pub accounts: Vec<AccountRecord>,
}

fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    match Raw::deserialize(d)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("credit is not a number: {s:?}"))),
    }
}

/// A user, joined with their account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    pub password: Option<String>,
    /// Base credit; `None` when the user has no account.
    pub credit: Option<f64>,
}

impl User {
    /// Base credit, zero without an account.
    #[must_use]
    pub fn base_credit(&self) -> f64 {
        self.credit.unwrap_or(0.0)
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Users indexed by id and by username.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_id: BTreeMap<UserId, User>,
    by_username: BTreeMap<String, UserId>,
}

impl UserDirectory {
    /// Join users with their accounts.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownUserId`] when an account names a user that is
    /// not in the users table.
    pub fn from_database(db: UserDatabase) -> Result<Self, SessionError> {
        let mut dir = Self::default();
        for record in db.users {
            dir.insert(User {
                id: record.user_id,
                username: record.username,
                first_name: record.first_name,
                last_name: record.last_name,
                email: record.email,
                password: record.password,
                credit: None,
            });
        }
        for account in db.accounts {
            let user = dir
                .by_id
                .get_mut(&account.user_id)
                .ok_or(SessionError::UnknownUserId(account.user_id))?;
            user.credit = Some(account.credit);
        }
        Ok(dir)
    }

    /// Build a directory from already-joined users.
    #[must_use]
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut dir = Self::default();
        for user in users {
            dir.insert(user);
        }
        dir
    }

    fn insert(&mut self, user: User) {
        if let Some(old) = self.by_id.get(&user.id) {
            self.by_username.remove(&old.username);
        }
        self.by_username.insert(user.username.clone(), user.id);
        self.by_id.insert(user.id, user);
    }

    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.by_id.get(&id)
    }

    #[must_use]
    pub fn by_username(&self, username: &str) -> Option<&User> {
        self.by_username
            .get(username)
            .and_then(|id| self.by_id.get(id))
    }

    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.by_id.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> + '_ {
        self.by_id.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = r#"{
        "users": [
            {"user_id": 1, "username": "ervtod", "first_name": "Ervin", "last_name": "Todd",
             "email": "e@example.com", "password": "pw1"},
            {"user_id": 2, "username": "hirchr", "first_name": "Hiro", "last_name": "Christ",
             "email": "h@example.com"},
            {"user_id": 3, "username": "nocred"}
        ],
        "account": [
            {"user_id": 1, "creditSEK": "120.5"},
            {"user_id": 2, "creditSEK": 40}
        ]
    }"#;

    fn directory() -> UserDirectory {
        UserDirectory::from_database(serde_json::from_str(DB).unwrap()).unwrap()
    }

    #[test]
    fn joins_accounts_with_string_or_number_credit() {
        let dir = directory();
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.get(UserId(1)).and_then(|u| u.credit), Some(120.5));
        assert_eq!(dir.get(UserId(2)).and_then(|u| u.credit), Some(40.0));
        assert_eq!(dir.get(UserId(3)).map(User::base_credit), Some(0.0));
    }

    #[test]
    fn lookup_by_username() {
        let dir = directory();
        let user = dir.by_username("hirchr").unwrap();
        assert_eq!(user.id, UserId(2));
        assert_eq!(user.full_name(), "Hiro Christ");
        assert!(dir.by_username("nobody").is_none());
    }

    #[test]
    fn account_for_unknown_user_is_an_error() {
        let db = UserDatabase {
            users: Vec::new(),
            accounts: vec![AccountRecord {
                user_id: UserId(9),
                credit: 1.0,
            }],
        };
        assert!(matches!(
            UserDirectory::from_database(db),
            Err(SessionError::UnknownUserId(UserId(9)))
        ));
    }

    #[test]
    fn malformed_credit_is_rejected() {
        let json = r#"{"users": [], "account": [{"user_id": 1, "creditSEK": "lots"}]}"#;
        assert!(serde_json::from_str::<UserDatabase>(json).is_err());
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_string(directory().get(UserId(1)).unwrap()).unwrap();
        assert!(!json.contains("pw1"));
        assert!(json.contains("\"firstName\":\"Ervin\""));
    }
}
