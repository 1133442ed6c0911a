use std::sync::Arc;

use axum::Router;

use crate::auth::AuthService;
use crate::config::{Config, StorageBackend};
use crate::db;
use crate::error::Result;
use crate::handlers::{auth, exercises, routines};
use crate::migrations::run_migrations;
use crate::models::DEFAULT_CATALOG;
use crate::repositories::{RoutineRepository, UserRepository};
use crate::routes;
use crate::storage::{MemoryStorage, SqliteStorage, Storage};

/// Opens the configured engine, migrating SQLite databases first.
pub fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageBackend::Sqlite => {
            tracing::info!("Connecting to database: {}", config.database_url);
            let pool = db::create_pool(&config.database_url)?;
            run_migrations(&pool)?;
            Ok(Arc::new(SqliteStorage::new(pool)))
        }
    }
}

pub fn seed_catalog(storage: &dyn Storage) -> Result<()> {
    let inserted = storage.seed_exercises(DEFAULT_CATALOG)?;
    if inserted > 0 {
        tracing::info!("Seeded {} exercises", inserted);
    }
    Ok(())
}

pub fn create_app(storage: Arc<dyn Storage>) -> Router {
    let user_repo = UserRepository::new(storage.clone());
    let routine_repo = RoutineRepository::new(storage);
    let auth_service = AuthService::new(user_repo);

    let auth_state = auth::AuthState {
        auth: auth_service.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        routine_repo: routine_repo.clone(),
    };
    let routines_state = routines::RoutinesState {
        routine_repo,
        auth: auth_service,
    };

    routes::create_router(auth_state, exercises_state, routines_state)
}
