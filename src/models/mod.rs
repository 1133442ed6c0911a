pub mod exercise;
pub mod from_row;
pub mod routine;
pub mod session;
pub mod user;

pub use exercise::{Exercise, SeedExercise, DEFAULT_CATALOG};
pub use from_row::FromSqliteRow;
pub use routine::{CreateRoutine, CreateRoutineExercise, ExerciseDetail, NewRoutine, Routine};
pub use session::UserSession;
pub use user::{LoginCredentials, NewUser, RegisterForm, User};
