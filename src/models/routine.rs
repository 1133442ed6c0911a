use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: u32 = 6;

/// One exercise inside a routine, with its set/rep target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDetail {
    pub exercise_id: i64,
    pub sets: u32,
    pub reps: u32,
}

impl ExerciseDetail {
    /// Zero means "unset": sets fall back to 3 and reps to 6.
    pub fn new(exercise_id: i64, sets: u32, reps: u32) -> Self {
        Self {
            exercise_id,
            sets: if sets == 0 { DEFAULT_SETS } else { sets },
            reps: if reps == 0 { DEFAULT_REPS } else { reps },
        }
    }
}

/// A validated routine that storage has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoutine {
    pub name: String,
    pub description: String,
    pub exercises: Vec<ExerciseDetail>,
}

impl NewRoutine {
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        exercises: Vec<ExerciseDetail>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Routine name is required".to_string(),
            ));
        }
        if exercises.is_empty() {
            return Err(AppError::Validation(
                "Routine must have at least one exercise".to_string(),
            ));
        }

        Ok(Self {
            name,
            description: description.into(),
            exercises,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub exercises: Vec<ExerciseDetail>,
}

impl Routine {
    pub fn from_new(id: i64, routine: NewRoutine) -> Self {
        Self {
            id,
            name: routine.name,
            description: routine.description,
            exercises: routine.exercises,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRoutine {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<CreateRoutineExercise>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoutineExercise {
    pub id: i64,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
}

impl CreateRoutine {
    pub fn into_routine(self) -> Result<NewRoutine> {
        let details = self
            .exercises
            .iter()
            .map(|e| ExerciseDetail::new(e.id, e.sets, e.reps))
            .collect();
        NewRoutine::create(self.name, self.description, details)
    }
}
