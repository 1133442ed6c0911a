use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, exercises, health, routines};

pub fn create_router(
    auth_state: auth::AuthState,
    exercises_state: exercises::ExercisesState,
    routines_state: routines::RoutinesState,
) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .with_state(auth_state)
        // Exercise catalog
        .route("/exercises", get(exercises::list))
        .with_state(exercises_state)
        // Routine routes
        .route("/routines", get(routines::list).post(routines::create))
        .route("/routine/{id}", get(routines::show))
        .with_state(routines_state)
}
