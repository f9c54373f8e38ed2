use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::profile::{Experience, Goal};
use crate::store::{Program, ProgramWithOwner};

/// Body of `POST /programs`. Missing fields come from the caller's profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub goals: Option<Goal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub instructions: Vec<String>,
}

impl From<Program> for ProgramView {
    fn from(p: Program) -> Self {
        Self {
            id: p.id,
            created_at: p.created_at,
            instructions: p.instructions,
        }
    }
}

/// One row of the public history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub program_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub instructions: Vec<String>,
    pub owner: PublicUser,
    pub mine: bool,
}

impl HistoryItem {
    pub fn new(row: ProgramWithOwner, viewer: Option<Uuid>) -> Self {
        let mine = viewer == Some(row.owner.id);
        Self {
            program_id: row.program.id,
            created_at: row.program.created_at,
            instructions: row.program.instructions,
            owner: row.owner.into(),
            mine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::User;

    fn row() -> ProgramWithOwner {
        let owner = User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            age: 30,
            experience: Experience::Beginner,
            goals: Goal::Technique,
            created_at: OffsetDateTime::now_utc(),
        };
        let program = Program {
            id: Uuid::new_v4(),
            user_id: owner.id,
            instructions: vec!["a".into(), "b".into()],
            created_at: OffsetDateTime::now_utc(),
        };
        ProgramWithOwner { owner, program }
    }

    #[test]
    fn history_item_marks_the_viewers_own_rows() {
        let r = row();
        let owner_id = r.owner.id;
        assert!(HistoryItem::new(r.clone(), Some(owner_id)).mine);
        assert!(!HistoryItem::new(r.clone(), Some(Uuid::new_v4())).mine);
        assert!(!HistoryItem::new(r, None).mine);
    }

    #[test]
    fn history_item_hides_the_password_hash() {
        let json = serde_json::to_value(HistoryItem::new(row(), None)).unwrap();
        assert_eq!(json["owner"]["name"], "Jane");
        assert_eq!(json["instructions"], serde_json::json!(["a", "b"]));
        assert!(json["owner"].get("password_hash").is_none());
    }

    #[test]
    fn generate_request_accepts_an_empty_body() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.experience.is_none() && req.goals.is_none());
    }
}
