use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use super::models::{encode_instructions, UserProfile};
use super::{NewUser, Program, ProgramStore, ProgramWithOwner, StoreError, StoreResult, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // insertion order
    programs: Vec<Program>,
}

impl Tables {
    fn insert_user(&mut self, profile: UserProfile) -> StoreResult<User> {
        if self.users.values().any(|u| u.email == profile.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: profile.name,
            email: profile.email,
            password_hash: profile.password_hash,
            age: profile.age,
            experience: profile.experience,
            goals: profile.goals,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn insert_program(&mut self, user_id: Uuid, instructions: &[String]) -> StoreResult<Program> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::ReferentialIntegrity(user_id));
        }
        Ok(self.push_program(user_id, instructions))
    }

    /// Caller guarantees `user_id` is present.
    fn push_program(&mut self, user_id: Uuid, instructions: &[String]) -> Program {
        let program = Program {
            id: Uuid::new_v4(),
            user_id,
            instructions: instructions.to_vec(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.programs.push(program.clone());
        program
    }
}

fn newest_first<'a>(programs: impl DoubleEndedIterator<Item = &'a Program>) -> Vec<Program> {
    let mut out: Vec<Program> = programs.rev().cloned().collect();
    // stable: equal timestamps stay newest-inserted first
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

/// Process-local store guarded by a single lock, so every write sees a
/// consistent snapshot of both tables.
#[derive(Clone, Default)]
pub struct InMemoryProgramStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgramStore for InMemoryProgramStore {
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let profile = new_user.into_profile()?;
        trace!("acquiring write lock");
        let mut tables = self.tables.write().await;
        let user = tables.insert_user(profile).map_err(|e| {
            warn!(error = %e, "create_user rejected");
            e
        })?;
        debug!(user_id = %user.id, "user stored in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    #[instrument(skip(self, instructions), fields(lines = instructions.len()))]
    async fn save_program(&self, user_id: Uuid, instructions: &[String]) -> StoreResult<Program> {
        encode_instructions(instructions)?;
        let mut tables = self.tables.write().await;
        let program = tables.insert_program(user_id, instructions)?;
        debug!(program_id = %program.id, "program stored in memory");
        Ok(program)
    }

    #[instrument(skip(self, new_user, instructions), fields(email = %new_user.email))]
    async fn create_user_with_program(
        &self,
        new_user: NewUser,
        instructions: &[String],
    ) -> StoreResult<(User, Program)> {
        let profile = new_user.into_profile()?;
        encode_instructions(instructions)?;

        // every check that can fail runs before the first write
        let mut tables = self.tables.write().await;
        let user = tables.insert_user(profile)?;
        let program = tables.push_program(user.id, instructions);
        Ok((user, program))
    }

    async fn list_programs_with_owners(&self) -> StoreResult<Vec<ProgramWithOwner>> {
        let tables = self.tables.read().await;
        newest_first(tables.programs.iter())
            .into_iter()
            .map(|program| -> StoreResult<ProgramWithOwner> {
                let owner = tables
                    .users
                    .get(&program.user_id)
                    .cloned()
                    .ok_or(StoreError::ReferentialIntegrity(program.user_id))?;
                Ok(ProgramWithOwner { owner, program })
            })
            .collect()
    }

    async fn list_programs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Program>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.programs.iter().filter(|p| p.user_id == user_id),
        ))
    }
}
