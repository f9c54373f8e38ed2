use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::profile::{Experience, Goal};

/// Registered lifter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed
    pub age: i32,
    pub experience: Experience,
    pub goals: Goal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Signup input. `experience` and `goals` fall back to the defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub experience: Option<Experience>,
    pub goals: Option<Goal>,
}

/// A [`NewUser`] that passed validation, with defaults applied.
#[derive(Debug, Clone)]
pub(crate) struct UserProfile {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub experience: Experience,
    pub goals: Goal,
}

impl NewUser {
    pub(crate) fn into_profile(self) -> StoreResult<UserProfile> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(StoreError::Validation("email is required".into()));
        }
        if self.password_hash.is_empty() {
            return Err(StoreError::Validation("password hash is required".into()));
        }
        if self.age <= 0 {
            return Err(StoreError::Validation("age must be a positive number".into()));
        }

        let experience = self.experience.unwrap_or_default();
        if !experience.is_known() {
            return Err(StoreError::Validation(format!(
                "unknown experience level: {experience}"
            )));
        }
        let goals = self.goals.unwrap_or_default();
        if !goals.is_known() {
            return Err(StoreError::Validation(format!("unknown goal: {goals}")));
        }

        Ok(UserProfile {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            age: self.age,
            experience,
            goals,
        })
    }
}

/// Generated program owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instructions: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One history row: a program together with the user who owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramWithOwner {
    pub owner: User,
    pub program: Program,
}

/// Instructions are stored one per line.
pub(crate) fn encode_instructions(lines: &[String]) -> StoreResult<String> {
    if let Some(bad) = lines
        .iter()
        .find(|l| l.is_empty() || l.contains(['\n', '\r']))
    {
        return Err(StoreError::Validation(format!(
            "instruction must be a single non-empty line: {bad:?}"
        )));
    }
    Ok(lines.join("\n"))
}

pub(crate) fn decode_instructions(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}

// ---- rows ----

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub experience: String,
    pub goals: String,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            age: r.age,
            experience: r.experience.into(),
            goals: r.goals.into(),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProgramRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instructions: String,
    pub created_at: OffsetDateTime,
}

impl From<ProgramRow> for Program {
    fn from(r: ProgramRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            instructions: decode_instructions(&r.instructions),
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProgramWithOwnerRow {
    pub program_id: Uuid,
    pub instructions: String,
    pub program_created_at: OffsetDateTime,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub experience: String,
    pub goals: String,
    pub user_created_at: OffsetDateTime,
}

impl From<ProgramWithOwnerRow> for ProgramWithOwner {
    fn from(r: ProgramWithOwnerRow) -> Self {
        Self {
            program: Program {
                id: r.program_id,
                user_id: r.user_id,
                instructions: decode_instructions(&r.instructions),
                created_at: r.program_created_at,
            },
            owner: User {
                id: r.user_id,
                name: r.name,
                email: r.email,
                password_hash: r.password_hash,
                age: r.age,
                experience: r.experience.into(),
                goals: r.goals.into(),
                created_at: r.user_created_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            age: 30,
            experience: None,
            goals: None,
        }
    }

    #[test]
    fn profile_applies_defaults() {
        let profile = new_user().into_profile().unwrap();
        assert_eq!(profile.experience, Experience::Beginner);
        assert_eq!(profile.goals, Goal::Strength);
    }

    #[test]
    fn profile_rejects_non_positive_age() {
        for age in [0, -3] {
            let err = NewUser { age, ..new_user() }.into_profile().unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }
    }

    #[test]
    fn profile_rejects_blank_fields() {
        let blank_name = NewUser { name: "  ".into(), ..new_user() };
        let blank_email = NewUser { email: String::new(), ..new_user() };
        let blank_hash = NewUser { password_hash: String::new(), ..new_user() };
        for candidate in [blank_name, blank_email, blank_hash] {
            assert!(matches!(
                candidate.into_profile(),
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn profile_rejects_unknown_levels_and_goals() {
        let level = NewUser {
            experience: Some(Experience::from("elite")),
            ..new_user()
        };
        let goal = NewUser {
            goals: Some(Goal::from("cardio")),
            ..new_user()
        };
        assert!(matches!(level.into_profile(), Err(StoreError::Validation(_))));
        assert!(matches!(goal.into_profile(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn instructions_keep_their_order_through_storage_text() {
        let lines: Vec<String> = ["Week 1: a", "Week 2: b", "Finish strong."]
            .into_iter()
            .map(String::from)
            .collect();
        let text = encode_instructions(&lines).unwrap();
        assert_eq!(text, "Week 1: a\nWeek 2: b\nFinish strong.");
        assert_eq!(decode_instructions(&text), lines);
    }

    #[test]
    fn empty_program_is_stored_as_empty_text() {
        assert_eq!(encode_instructions(&[]).unwrap(), "");
        assert!(decode_instructions("").is_empty());
    }

    #[test]
    fn multi_line_or_empty_instructions_are_rejected() {
        let multi = vec!["Week 1\nWeek 2".to_string()];
        let empty = vec!["Week 1".to_string(), String::new()];
        assert!(matches!(
            encode_instructions(&multi),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            encode_instructions(&empty),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password_hash: "secret-hash".into(),
            age: 30,
            experience: Experience::Intermediate,
            goals: Goal::Endurance,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains(r#""experience":"intermediate""#));
    }
}
