//! User record, inbound payloads and their validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Persisted user. The password field only ever holds an argon2 PHC string.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a user; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub avatar_url: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.avatar_url.is_none()
    }
}

/// Body of `POST /api/users` and `POST /api/auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 3, max = 32), custom(function = "validate_username_chars"))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Body of `PATCH /api/users/{id}`. Absent and `null` fields are both left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 32), custom(function = "validate_username_chars"))]
    pub username: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`. Deliberately unvalidated beyond presence.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    if username.chars().all(allowed) {
        Ok(())
    } else {
        Err(ValidationError::new("charset"))
    }
}

/// Robohash avatar for a username. Deterministic.
pub fn avatar_url(username: &str) -> String {
    format!("https://robohash.org/{}?set=set1&size=150x150", username)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> UserRequest {
        UserRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn avatar_is_derived_from_username() {
        assert_eq!(
            avatar_url("alice"),
            "https://robohash.org/alice?set=set1&size=150x150"
        );
        assert_eq!(avatar_url("alice"), avatar_url("alice"));
        assert_ne!(avatar_url("alice"), avatar_url("bob"));
    }

    #[test]
    fn accepts_well_formed_user() {
        assert!(request("alice", "secret1").validate().is_ok());
        assert!(request("jump.higher_99-x", "secret1").validate().is_ok());
    }

    #[test]
    fn rejects_bad_username() {
        assert!(request("al", "secret1").validate().is_err());
        assert!(request(&"a".repeat(33), "secret1").validate().is_err());
        assert!(request("alice smith", "secret1").validate().is_err());
        assert!(request("alice/../x", "secret1").validate().is_err());
    }

    #[test]
    fn rejects_short_password() {
        assert!(request("alice", "12345").validate().is_err());
    }

    #[test]
    fn update_only_checks_supplied_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());
        let rename = UpdateUserRequest {
            username: Some("bob".into()),
            password: None,
        };
        assert!(rename.validate().is_ok());
        let cleared = UpdateUserRequest {
            username: Some(String::new()),
            password: None,
        };
        assert!(cleared.validate().is_err());
    }

    #[test]
    fn password_is_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password: "$argon2id$v=19$...".into(),
            avatar_url: avatar_url("alice"),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }
}
