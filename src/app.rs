use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            put(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/stats", get(handlers::get_habit_stats))
        .route("/api/progress", get(handlers::list_progress))
        .route("/api/progress/toggle", post(handlers::toggle_progress))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/share", post(handlers::create_share_link))
        .route("/api/shared", get(handlers::get_shared))
        .route("/api/export/json", get(handlers::export_json_file))
        .route("/api/export/csv", get(handlers::export_csv_file))
        .with_state(state)
}
