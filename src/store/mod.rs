//! Persistence of users and their generated programs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod models;
mod postgres;

pub use memory::InMemoryProgramStore;
pub use models::{NewUser, Program, ProgramWithOwner, User};
pub use postgres::{PgProgramStore, MIGRATOR};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user {0} does not exist")]
    ReferentialIntegrity(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Users and the programs generated for them.
///
/// Implementations enforce email uniqueness and program ownership
/// themselves; callers never pre-check.
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Insert a user, applying the default experience and goal.
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Persist a program for an existing user, keeping the line order.
    async fn save_program(&self, user_id: Uuid, instructions: &[String]) -> StoreResult<Program>;

    /// Create a user and their first program atomically: either both rows
    /// exist afterwards or neither does.
    async fn create_user_with_program(
        &self,
        new_user: NewUser,
        instructions: &[String],
    ) -> StoreResult<(User, Program)>;

    /// Every program with its owner, newest first.
    async fn list_programs_with_owners(&self) -> StoreResult<Vec<ProgramWithOwner>>;

    /// One user's programs, newest first.
    async fn list_programs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Program>>;
}
