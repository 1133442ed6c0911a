use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::Exercise;
use crate::repositories::RoutineRepository;

#[derive(Clone)]
pub struct ExercisesState {
    pub routine_repo: RoutineRepository,
}

pub async fn list(State(state): State<ExercisesState>) -> Result<Json<Vec<Exercise>>> {
    let exercises = state.routine_repo.exercises().await?;
    Ok(Json(exercises))
}
