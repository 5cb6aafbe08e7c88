use serde::Serialize;

use crate::{Entity, UserId};

/// A registered user.
///
/// `password_hash` is never serialized; responses only ever expose
/// `{id, username, email}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// A user about to be inserted (id not yet assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        NewUser {
            username: "ann".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
        .with_id(UserId::new(1))
    }

    #[test]
    fn serialization_omits_password_hash() {
        let json = serde_json::to_value(ann()).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "username": "ann", "email": "a@b.com"}));
    }

    #[test]
    fn debug_output_redacts_password_hash() {
        let out = format!("{:?}", ann());
        assert!(!out.contains("$2b$"));
        assert!(out.contains("<redacted>"));
    }
}
