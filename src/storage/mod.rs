//! Persistence engines.
//!
//! Both engines implement [`Storage`], a blocking interface the repositories
//! drive from `spawn_blocking`. `SqliteStorage` is the production engine;
//! `MemoryStorage` keeps everything in owned maps for dev and test runs.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::error::Result;
use crate::models::{Exercise, NewRoutine, NewUser, Routine, SeedExercise, User, UserSession};

pub trait Storage: Send + Sync {
    fn exercises(&self) -> Result<Vec<Exercise>>;

    /// Inserts the catalog only when no exercise exists yet. Returns how many
    /// rows were inserted.
    fn seed_exercises(&self, catalog: &[SeedExercise]) -> Result<usize>;

    /// Stores the routine and its exercises atomically, keeping their order.
    fn save_routine(&self, user_id: i64, routine: &NewRoutine) -> Result<Routine>;

    fn routines(&self, user_id: i64) -> Result<Vec<Routine>>;

    fn routine(&self, routine_id: i64) -> Result<Option<Routine>>;

    fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `AlreadyExists` when the username is taken.
    fn save_user(&self, user: &NewUser) -> Result<User>;

    /// Replaces any existing session of the user.
    fn save_session(&self, user_id: i64, session_token: &str, csrf_token: &str) -> Result<()>;

    fn user_session(&self, user_id: i64) -> Result<Option<UserSession>>;

    /// No-op when the user has no session.
    fn delete_session(&self, user_id: i64) -> Result<()>;
}
