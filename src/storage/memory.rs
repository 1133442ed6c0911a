use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::Storage;
use crate::error::{AppError, Result};
use crate::models::{
    Exercise, NewRoutine, NewUser, Routine, SeedExercise, User, UserSession,
};

#[derive(Default)]
struct State {
    exercises: BTreeMap<i64, Exercise>,
    /// Routine id → (owner id, routine).
    routines: BTreeMap<i64, (i64, Routine)>,
    users: HashMap<String, User>,
    sessions: HashMap<i64, UserSession>,
    next_exercise_id: i64,
    next_routine_id: i64,
    next_user_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Storage backed by owned maps. The mutex makes every operation atomic, so
/// a routine is never visible half-written and a user never has two sessions.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.state()?.exercises.values().cloned().collect())
    }

    fn seed_exercises(&self, catalog: &[SeedExercise]) -> Result<usize> {
        let mut state = self.state()?;
        if !state.exercises.is_empty() {
            return Ok(0);
        }

        for exercise in catalog {
            let id = next_id(&mut state.next_exercise_id);
            state.exercises.insert(
                id,
                Exercise {
                    id,
                    name: exercise.name.to_string(),
                    target: exercise.target.to_string(),
                },
            );
        }

        Ok(catalog.len())
    }

    fn save_routine(&self, user_id: i64, routine: &NewRoutine) -> Result<Routine> {
        let mut state = self.state()?;

        if !state.users.values().any(|u| u.id == user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        // Validate everything before touching the maps
        if let Some(unknown) = routine
            .exercises
            .iter()
            .find(|detail| !state.exercises.contains_key(&detail.exercise_id))
        {
            return Err(AppError::Validation(format!(
                "Unknown exercise id {}",
                unknown.exercise_id
            )));
        }

        let id = next_id(&mut state.next_routine_id);
        let stored = Routine::from_new(id, routine.clone());
        state.routines.insert(id, (user_id, stored.clone()));

        Ok(stored)
    }

    fn routines(&self, user_id: i64) -> Result<Vec<Routine>> {
        Ok(self
            .state()?
            .routines
            .values()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, routine)| routine.clone())
            .collect())
    }

    fn routine(&self, routine_id: i64) -> Result<Option<Routine>> {
        Ok(self
            .state()?
            .routines
            .get(&routine_id)
            .map(|(_, routine)| routine.clone()))
    }

    fn find_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.state()?.users.get(username).cloned())
    }

    fn save_user(&self, user: &NewUser) -> Result<User> {
        let mut state = self.state()?;
        if state.users.contains_key(&user.username) {
            return Err(AppError::AlreadyExists(
                "Username already exists".to_string(),
            ));
        }

        let stored = User {
            id: next_id(&mut state.next_user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(stored.username.clone(), stored.clone());

        Ok(stored)
    }

    fn save_session(&self, user_id: i64, session_token: &str, csrf_token: &str) -> Result<()> {
        self.state()?.sessions.insert(
            user_id,
            UserSession {
                user_id,
                session_token: session_token.to_string(),
                csrf_token: csrf_token.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn user_session(&self, user_id: i64) -> Result<Option<UserSession>> {
        Ok(self.state()?.sessions.get(&user_id).cloned())
    }

    fn delete_session(&self, user_id: i64) -> Result<()> {
        self.state()?.sessions.remove(&user_id);
        Ok(())
    }
}
