use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        jwt::{JwtKeys, TokenPair},
        password::{hash_password, is_long_enough},
        services::{is_valid_email, normalize_email, verify_credentials},
    },
    error::ApiError,
    programs::generator,
    state::AppState,
    store::NewUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user_id: uuid::Uuid) -> Result<TokenPair, ApiError> {
    JwtKeys::from_ref(state).issue_pair(user_id).map_err(|e| {
        error!(error = %e, user_id = %user_id, "jwt sign failed");
        ApiError::internal(e)
    })
}

/// Signup: create the account and its first program in one step.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if !is_long_enough(&payload.password) {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal(e)
    })?;

    let experience = payload.experience.unwrap_or_default();
    let goals = payload.goals.unwrap_or_default();
    let instructions = generator::generate(&experience, &goals);

    let (user, program) = state
        .store
        .create_user_with_program(
            NewUser {
                name: payload.name,
                email,
                password_hash,
                age: payload.age,
                experience: Some(experience),
                goals: Some(goals),
            },
            &instructions,
        )
        .await?;

    let tokens = issue_tokens(&state, user.id)?;

    info!(user_id = %user.id, email = %user.email, program_id = %program.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            tokens,
            user: user.into(),
            program: Some(program.into()),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let user = verify_credentials(state.store.as_ref(), &email, &payload.password).await?;
    let tokens = issue_tokens(&state, user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        tokens,
        user: user.into(),
        program: None,
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let claims = JwtKeys::from_ref(&state)
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    let tokens = issue_tokens(&state, user.id)?;
    Ok(Json(AuthResponse {
        tokens,
        user: user.into(),
        program: None,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        error!(user_id = %user_id, "user not found");
        ApiError::Unauthorized("User not found".into())
    })?;

    Ok(Json(user.into()))
}
