use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::jwt::TokenPair;
use crate::profile::{Experience, Goal};
use crate::programs::dto::ProgramView;
use crate::store::User;

/// Signup form.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub goals: Option<Goal>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response to register, login and refresh. Register also returns the
/// first generated program.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramView>,
}

/// Profile fields safe to hand to any client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub experience: Experience,
    pub goals: Goal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            age: u.age,
            experience: u.experience,
            goals: u.goals,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_profile_fields_are_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Jane","email":"jane@x.com","password":"secret12","age":30}"#,
        )
        .unwrap();
        assert!(req.experience.is_none());
        assert!(req.goals.is_none());
    }

    #[test]
    fn register_request_rejects_non_numeric_age() {
        let res = serde_json::from_str::<RegisterRequest>(
            r#"{"name":"Jane","email":"jane@x.com","password":"secret12","age":"thirty"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            age: 30,
            experience: Experience::Intermediate,
            goals: Goal::Endurance,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "jane@x.com");
        assert_eq!(json["experience"], "intermediate");
        assert_eq!(json["goals"], "endurance");
        assert!(json.get("password_hash").is_none());
    }
}
