use chrono::Utc;
use rusqlite::{ffi, OptionalExtension};

use super::Storage;
use crate::db::{DbConnection, DbPool};
use crate::error::{AppError, Result};
use crate::models::{
    Exercise, ExerciseDetail, FromSqliteRow, NewRoutine, NewUser, Routine, SeedExercise, User,
    UserSession,
};

const ROUTINE_COLUMNS: &str = "SELECT r.id, r.name, r.description,
            re.exercise_id, re.sets, re.reps
     FROM routines r
     LEFT JOIN routine_exercises re ON re.routine_id = r.id";

#[derive(Clone)]
pub struct SqliteStorage {
    pool: DbPool,
}

impl SqliteStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// True when `err` is the given extended constraint violation.
fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code
    )
}

/// Folds rows of the routine/exercise left join into routines. Rows must be
/// ordered by routine id, then `order_index`.
fn collect_routines(rows: &mut rusqlite::Rows<'_>) -> rusqlite::Result<Vec<Routine>> {
    let mut routines: Vec<Routine> = Vec::new();

    while let Some(row) = rows.next()? {
        let id: i64 = row.get("id")?;
        if routines.last().map(|r| r.id) != Some(id) {
            routines.push(Routine {
                id,
                name: row.get("name")?,
                description: row.get("description")?,
                exercises: Vec::new(),
            });
        }

        // A routine without exercises yields one row of NULLs from the join
        let exercise_id: Option<i64> = row.get("exercise_id")?;
        if let (Some(exercise_id), Some(routine)) = (exercise_id, routines.last_mut()) {
            routine.exercises.push(ExerciseDetail {
                exercise_id,
                sets: row.get("sets")?,
                reps: row.get("reps")?,
            });
        }
    }

    Ok(routines)
}

impl Storage for SqliteStorage {
    fn exercises(&self) -> Result<Vec<Exercise>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, target FROM exercises ORDER BY id")?;
        let exercises = stmt
            .query_map([], Exercise::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exercises)
    }

    fn seed_exercises(&self, catalog: &[SeedExercise]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        if count > 0 {
            tracing::debug!("Exercise catalog already has {} rows, skipping seed", count);
            return Ok(0);
        }

        {
            let mut stmt = tx.prepare("INSERT INTO exercises (name, target) VALUES (?, ?)")?;
            for exercise in catalog {
                stmt.execute(rusqlite::params![exercise.name, exercise.target])?;
            }
        }
        tx.commit()?;

        Ok(catalog.len())
    }

    fn save_routine(&self, user_id: i64, routine: &NewRoutine) -> Result<Routine> {
        let mut conn = self.conn()?;
        // Dropping the transaction on any early return rolls it back
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO routines (name, description, user_id) VALUES (?, ?, ?)",
            rusqlite::params![routine.name, routine.description, user_id],
        )
        .map_err(|e| {
            if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                AppError::NotFound("User not found".to_string())
            } else {
                AppError::Database(e)
            }
        })?;
        let routine_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO routine_exercises (routine_id, exercise_id, order_index, sets, reps)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for (index, detail) in routine.exercises.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    routine_id,
                    detail.exercise_id,
                    index as i64,
                    detail.sets,
                    detail.reps
                ])
                .map_err(|e| {
                    if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                        AppError::Validation(format!(
                            "Unknown exercise id {}",
                            detail.exercise_id
                        ))
                    } else {
                        AppError::Database(e)
                    }
                })?;
            }
        }

        tx.commit()?;

        Ok(Routine::from_new(routine_id, routine.clone()))
    }

    fn routines(&self, user_id: i64) -> Result<Vec<Routine>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{ROUTINE_COLUMNS} WHERE r.user_id = ? ORDER BY r.id, re.order_index"
        ))?;
        let mut rows = stmt.query([user_id])?;
        Ok(collect_routines(&mut rows)?)
    }

    fn routine(&self, routine_id: i64) -> Result<Option<Routine>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{ROUTINE_COLUMNS} WHERE r.id = ? ORDER BY re.order_index"
        ))?;
        let mut rows = stmt.query([routine_id])?;
        Ok(collect_routines(&mut rows)?.into_iter().next())
    }

    fn find_user(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )?;
        let user = stmt.query_row([username], User::from_row).optional()?;
        Ok(user)
    }

    fn save_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
            rusqlite::params![user.username, user.email, user.password_hash, now],
        )
        .map_err(|e| {
            if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) {
                AppError::AlreadyExists("Username already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(User {
            id: conn.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
        })
    }

    fn save_session(&self, user_id: i64, session_token: &str, csrf_token: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM sessions WHERE user_id = ?", [user_id])?;
        tx.execute(
            "INSERT INTO sessions (user_id, session_token, csrf_token, created_at)
             VALUES (?, ?, ?, ?)",
            rusqlite::params![user_id, session_token, csrf_token, Utc::now()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn user_session(&self, user_id: i64) -> Result<Option<UserSession>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, session_token, csrf_token, created_at FROM sessions WHERE user_id = ?",
        )?;
        let session = stmt.query_row([user_id], UserSession::from_row).optional()?;
        Ok(session)
    }

    fn delete_session(&self, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sessions WHERE user_id = ?", [user_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;
    use crate::models::DEFAULT_CATALOG;

    fn storage() -> SqliteStorage {
        let pool = create_memory_pool().unwrap();
        run_migrations_for_tests(&pool).unwrap();
        let storage = SqliteStorage::new(pool);
        storage.seed_exercises(DEFAULT_CATALOG).unwrap();
        storage
    }

    fn user(storage: &SqliteStorage, username: &str) -> User {
        storage
            .save_user(&NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
            })
            .unwrap()
    }

    fn count(storage: &SqliteStorage, table: &str) -> i64 {
        storage
            .conn()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_seed_is_idempotent() {
        let storage = storage();
        assert_eq!(storage.exercises().unwrap().len(), DEFAULT_CATALOG.len());
        assert_eq!(storage.seed_exercises(DEFAULT_CATALOG).unwrap(), 0);
        assert_eq!(storage.exercises().unwrap().len(), DEFAULT_CATALOG.len());
    }

    #[test]
    fn test_unknown_exercise_rolls_back_routine() {
        let storage = storage();
        let alice = user(&storage, "alice");
        let routine = NewRoutine::create(
            "Broken",
            "",
            vec![ExerciseDetail::new(1, 3, 6), ExerciseDetail::new(9999, 3, 6)],
        )
        .unwrap();

        let result = storage.save_routine(alice.id, &routine);

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(count(&storage, "routines"), 0);
        assert_eq!(count(&storage, "routine_exercises"), 0);
    }

    #[test]
    fn test_routine_for_unknown_user_is_not_found() {
        let storage = storage();
        let routine = NewRoutine::create("Orphan", "", vec![ExerciseDetail::new(1, 3, 6)]).unwrap();

        let result = storage.save_routine(42, &routine);

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(count(&storage, "routines"), 0);
        assert_eq!(count(&storage, "routine_exercises"), 0);
    }

    #[test]
    fn test_routine_without_exercise_rows_reads_back_empty() {
        let storage = storage();
        let alice = user(&storage, "alice");
        storage
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO routines (name, description, user_id) VALUES ('Bare', '', ?)",
                [alice.id],
            )
            .unwrap();

        let routines = storage.routines(alice.id).unwrap();
        assert_eq!(routines.len(), 1);
        assert_eq!(routines[0].name, "Bare");
        assert!(routines[0].exercises.is_empty());
    }

    #[test]
    fn test_duplicate_username_is_rejected_by_constraint() {
        let storage = storage();
        user(&storage, "alice");
        let result = storage.save_user(&NewUser {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "other".to_string(),
        });
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
        assert_eq!(count(&storage, "users"), 1);
    }

    #[test]
    fn test_save_session_keeps_one_row_per_user() {
        let storage = storage();
        let alice = user(&storage, "alice");
        storage.save_session(alice.id, "t1", "c1").unwrap();
        storage.save_session(alice.id, "t2", "c2").unwrap();
        assert_eq!(count(&storage, "sessions"), 1);
    }
}
