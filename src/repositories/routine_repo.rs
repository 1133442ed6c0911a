use std::sync::Arc;

use super::run_blocking;
use crate::error::{AppError, Result};
use crate::models::{Exercise, NewRoutine, Routine};
use crate::storage::Storage;

#[derive(Clone)]
pub struct RoutineRepository {
    storage: Arc<dyn Storage>,
}

impl RoutineRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn exercises(&self) -> Result<Vec<Exercise>> {
        run_blocking(&self.storage, |s| s.exercises()).await
    }

    pub async fn set_routine(&self, user_id: i64, routine: NewRoutine) -> Result<Routine> {
        // NewRoutine has public fields, so it may not have come through NewRoutine::create
        if routine.exercises.is_empty() {
            return Err(AppError::Validation(
                "Routine must have at least one exercise".to_string(),
            ));
        }

        run_blocking(&self.storage, move |s| s.save_routine(user_id, &routine)).await
    }

    pub async fn get_routines(&self, user_id: i64) -> Result<Vec<Routine>> {
        run_blocking(&self.storage, move |s| s.routines(user_id)).await
    }

    pub async fn get_routine(&self, routine_id: i64) -> Result<Routine> {
        run_blocking(&self.storage, move |s| s.routine(routine_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Routine not found".to_string()))
    }
}
