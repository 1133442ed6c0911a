use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthService;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateRoutine, Routine};
use crate::repositories::RoutineRepository;

#[derive(Clone, FromRef)]
pub struct RoutinesState {
    pub routine_repo: RoutineRepository,
    pub auth: AuthService,
}

pub async fn create(
    State(state): State<RoutinesState>,
    auth_user: AuthUser,
    payload: std::result::Result<Json<CreateRoutine>, JsonRejection>,
) -> Result<(StatusCode, Json<Routine>)> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let routine = request.into_routine()?;

    let routine = state.routine_repo.set_routine(auth_user.id, routine).await?;
    tracing::info!(
        user_id = auth_user.id,
        routine_id = routine.id,
        exercises = routine.exercises.len(),
        "Routine created"
    );

    Ok((StatusCode::CREATED, Json(routine)))
}

pub async fn list(
    State(state): State<RoutinesState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Routine>>> {
    let routines = state.routine_repo.get_routines(auth_user.id).await?;
    Ok(Json(routines))
}

/// Any authorized user can read any routine by id; ownership is not checked.
pub async fn show(
    State(state): State<RoutinesState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Routine>> {
    let routine = state.routine_repo.get_routine(id).await?;
    Ok(Json(routine))
}
