use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::{
    encode_instructions, ProgramRow, ProgramWithOwnerRow, UserProfile, UserRow,
};
use super::{NewUser, Program, ProgramStore, ProgramWithOwner, StoreError, StoreResult, User};

/// Migrations embedded at compile time from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Postgres-backed store. Each call borrows a pooled connection and returns
/// it when the call ends, whichever way it ends.
#[derive(Clone)]
pub struct PgProgramStore {
    db: PgPool,
}

impl PgProgramStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        MIGRATOR
            .run(&self.db)
            .await
            .context("failed to run database migrations")?;
        info!("migrations applied");
        Ok(())
    }
}

fn user_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
        if db.is_check_violation() {
            return StoreError::Validation(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

fn program_insert_error(err: sqlx::Error, user_id: Uuid) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::ReferentialIntegrity(user_id)
        }
        _ => StoreError::Database(err),
    }
}

async fn insert_user<'e>(db: impl PgExecutor<'e>, profile: &UserProfile) -> StoreResult<User> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, email, password_hash, age, experience, goals)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, password_hash, age, experience, goals, created_at
        "#,
    )
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(&profile.password_hash)
    .bind(profile.age)
    .bind(profile.experience.as_str())
    .bind(profile.goals.as_str())
    .fetch_one(db)
    .await
    .map_err(user_insert_error)?;
    Ok(row.into())
}

async fn insert_program<'e>(
    db: impl PgExecutor<'e>,
    user_id: Uuid,
    text: &str,
) -> StoreResult<Program> {
    let row = sqlx::query_as::<_, ProgramRow>(
        r#"
        INSERT INTO programs (user_id, instructions)
        VALUES ($1, $2)
        RETURNING id, user_id, instructions, created_at
        "#,
    )
    .bind(user_id)
    .bind(text)
    .fetch_one(db)
    .await
    .map_err(|e| program_insert_error(e, user_id))?;
    Ok(row.into())
}

#[async_trait]
impl ProgramStore for PgProgramStore {
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let profile = new_user.into_profile()?;
        let user = insert_user(&self.db, &profile).await.map_err(|e| {
            warn!(error = %e, "create_user failed");
            e
        })?;
        debug!(user_id = %user.id, "user inserted");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, age, experience, goals, created_at
              FROM users
             WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, age, experience, goals, created_at
              FROM users
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self, instructions), fields(lines = instructions.len()))]
    async fn save_program(&self, user_id: Uuid, instructions: &[String]) -> StoreResult<Program> {
        let text = encode_instructions(instructions)?;
        let program = insert_program(&self.db, user_id, &text).await.map_err(|e| {
            warn!(error = %e, "save_program failed");
            e
        })?;
        debug!(program_id = %program.id, "program inserted");
        Ok(program)
    }

    #[instrument(skip(self, new_user, instructions), fields(email = %new_user.email))]
    async fn create_user_with_program(
        &self,
        new_user: NewUser,
        instructions: &[String],
    ) -> StoreResult<(User, Program)> {
        let profile = new_user.into_profile()?;
        let text = encode_instructions(instructions)?;

        // dropped without commit => rolled back
        let mut tx = self.db.begin().await?;
        let user = insert_user(&mut *tx, &profile).await?;
        let program = insert_program(&mut *tx, user.id, &text).await?;
        tx.commit().await?;

        debug!(user_id = %user.id, program_id = %program.id, "user and program committed");
        Ok((user, program))
    }

    #[instrument(skip(self))]
    async fn list_programs_with_owners(&self) -> StoreResult<Vec<ProgramWithOwner>> {
        let rows = sqlx::query_as::<_, ProgramWithOwnerRow>(
            r#"
            SELECT p.id AS program_id,
                   p.instructions,
                   p.created_at AS program_created_at,
                   u.id AS user_id,
                   u.name,
                   u.email,
                   u.password_hash,
                   u.age,
                   u.experience,
                   u.goals,
                   u.created_at AS user_created_at
              FROM programs p
              JOIN users u ON u.id = p.user_id
             ORDER BY p.created_at DESC, p.seq DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(ProgramWithOwner::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_programs_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Program>> {
        let rows = sqlx::query_as::<_, ProgramRow>(
            r#"
            SELECT id, user_id, instructions, created_at
              FROM programs
             WHERE user_id = $1
             ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Program::from).collect())
    }
}
