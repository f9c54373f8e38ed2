use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::extractors::{AuthUser, RequestContext},
    error::ApiError,
    programs::{
        dto::{GenerateRequest, HistoryItem, ProgramView},
        generator,
    },
    state::AppState,
};

pub fn program_routes() -> Router<AppState> {
    Router::new()
        .route("/programs", get(list_history).post(create_program))
        .route("/me/programs", get(my_programs))
}

/// An empty body means "use my profile"; anything else must be a valid request.
fn parse_generate_request(body: &[u8]) -> Result<GenerateRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed program request");
        ApiError::BadRequest(format!("Invalid request body: {e}"))
    })
}

/// Generate a new program for the caller and save it.
#[instrument(skip(state, body))]
pub async fn create_program(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> Result<(StatusCode, Json<ProgramView>), ApiError> {
    let payload = parse_generate_request(&body)?;

    let user = state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        error!(user_id = %user_id, "user not found");
        ApiError::Unauthorized("User not found".into())
    })?;

    let experience = payload.experience.unwrap_or(user.experience);
    let goals = payload.goals.unwrap_or(user.goals);
    let instructions = generator::generate(&experience, &goals);

    let program = state.store.save_program(user.id, &instructions).await?;

    info!(user_id = %user.id, program_id = %program.id, %experience, %goals, "program generated");
    Ok((StatusCode::CREATED, Json(program.into())))
}

/// Every saved program with its owner, newest first.
#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    let rows = state.store.list_programs_with_owners().await?;
    let items = rows
        .into_iter()
        .map(|row| HistoryItem::new(row, ctx.user_id))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn my_programs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ProgramView>>, ApiError> {
    let programs = state.store.list_programs_for_user(user_id).await?;
    Ok(Json(programs.into_iter().map(ProgramView::from).collect()))
}
