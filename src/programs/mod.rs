use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod generator;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::program_routes()
}
