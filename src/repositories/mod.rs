pub mod routine_repo;
pub mod user_repo;

pub use routine_repo::RoutineRepository;
pub use user_repo::UserRepository;

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::storage::Storage;

/// Runs blocking storage work off the async runtime.
async fn run_blocking<T, F>(storage: &Arc<dyn Storage>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Storage) -> Result<T> + Send + 'static,
{
    let storage = Arc::clone(storage);
    tokio::task::spawn_blocking(move || f(storage.as_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}
