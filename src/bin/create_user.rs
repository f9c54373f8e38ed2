//! Insert one user from the command line.

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use liftplan::auth::{
    password::hash_password,
    services::{is_valid_email, normalize_email},
};
use liftplan::profile::{Experience, Goal};
use liftplan::store::{NewUser, PgProgramStore, ProgramStore};

#[derive(Parser)]
#[command(name = "create_user", about = "Create a liftplan user")]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    age: i32,
    /// beginner, intermediate or advanced
    #[arg(long)]
    experience: Option<String>,
    /// strength, technique or endurance
    #[arg(long)]
    goals: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "liftplan=info".to_string()),
        )
        .init();

    let cli = Cli::parse();

    let email = normalize_email(&cli.email);
    if !is_valid_email(&email) {
        anyhow::bail!("invalid email {:?}", cli.email);
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&cli.database_url)
        .await
        .context("connecting to postgres")?;
    let store = PgProgramStore::new(pool);
    store.migrate().await?;

    let password_hash = hash_password(&cli.password).context("hashing password")?;
    let user = store
        .create_user(NewUser {
            name: cli.name,
            email,
            password_hash,
            age: cli.age,
            experience: cli.experience.map(Experience::from),
            goals: cli.goals.map(Goal::from),
        })
        .await
        .context("creating user")?;

    println!("User {} created with id {}", user.email, user.id);
    Ok(())
}
