use crate::analytics::{build_dashboard_at, habit_stats};
use crate::errors::AppError;
use crate::export::{export_csv, export_filename, export_json};
use crate::models::{
    AppData, DashboardResponse, Habit, HabitFields, HabitStats, ProgressEntry, ShareRequest,
    ShareResponse, SharedView, StatsQuery, ToggleRequest,
};
use crate::share;
use crate::state::AppState;
use crate::storage::persist_data;
use crate::store::{HabitStore, ProgressStore};
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri, header},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    Json(data.list())
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(fields): Json<HabitFields>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let mut data = state.data.lock().await;
    let habit = data.create(fields, Utc::now())?;
    persist_data(&state.data_path, &data).await?;

    info!(id = %habit.id, "created habit {}", habit.name);
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<HabitFields>,
) -> Result<Json<Habit>, AppError> {
    let mut data = state.data.lock().await;
    let habit = data.update(&id, fields, Utc::now())?;
    persist_data(&state.data_path, &data).await?;

    info!(id = %habit.id, "updated habit");
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    data.delete(&id)?;
    persist_data(&state.data_path, &data).await?;

    info!(id = %id, "deleted habit");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_progress(State(state): State<AppState>) -> Json<Vec<ProgressEntry>> {
    let data = state.data.lock().await;
    Json(data.list_all())
}

pub async fn toggle_progress(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ProgressEntry>, AppError> {
    let date = payload.date.unwrap_or_else(|| state.today());
    let mut data = state.data.lock().await;
    let entry = data.toggle(&payload.habit_id, date)?;
    persist_data(&state.data_path, &data).await?;

    info!(habit_id = %entry.habit_id, %date, done = entry.done, "toggled progress");
    Ok(Json(entry))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let today = state.today();
    let week = query.week.unwrap_or(today);
    let data = state.data.lock().await;
    build_dashboard_at(today, week, &data)
        .map(Json)
        .ok_or_else(|| AppError::bad_request(format!("week out of range: {week}")))
}

pub async fn get_habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitStats>, AppError> {
    let today = state.today();
    let data = state.data.lock().await;
    if !data.habits.iter().any(|habit| habit.id == id) {
        return Err(AppError::not_found(format!("habit not found: {id}")));
    }
    Ok(Json(habit_stats(&data.progress, &id, today)))
}

pub async fn create_share_link(
    State(state): State<AppState>,
    Json(payload): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    let base_url = payload.base_url.trim();
    if base_url.is_empty() {
        return Err(AppError::bad_request("base_url must not be empty"));
    }

    let data = state.data.lock().await;
    let url = share::encode(&data.habits, &data.progress, base_url).map_err(AppError::internal)?;

    info!(habits = data.habits.len(), bytes = url.len(), "generated share link");
    Ok(Json(ShareResponse { url }))
}

pub async fn get_shared(State(state): State<AppState>, uri: Uri) -> Result<Json<SharedView>, AppError> {
    let link = uri.to_string();
    let snapshot = match share::decode(&link) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Err(AppError::not_found("no shared data in link")),
        Err(err) => {
            warn!("rejected share link: {err}");
            return Err(err.into());
        }
    };

    let today = state.today();
    let shared = AppData {
        habits: snapshot.habits,
        progress: snapshot.progress,
    };
    let dashboard = build_dashboard_at(today, today, &shared)
        .ok_or_else(|| AppError::bad_request(format!("week out of range: {today}")))?;

    Ok(Json(SharedView {
        read_only: true,
        habits: shared.habits,
        progress: shared.progress,
        dashboard,
    }))
}

pub async fn export_json_file(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = state.data.lock().await;
    let body = export_json(&data.list(), &data.progress, Utc::now()).map_err(AppError::internal)?;
    Ok(download(body, "application/json", export_filename(state.today(), "json")))
}

pub async fn export_csv_file(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.data.lock().await;
    let body = export_csv(&data.list());
    download(body, "text/csv; charset=utf-8", export_filename(state.today(), "csv"))
}

fn download(body: String, content_type: &'static str, filename: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}
